// Copyright 2025 itscheems
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

use crate::view::BookGrouping;

/// Default number of times a conflicting sweep is restarted
pub const DEFAULT_SWEEP_MAX_RETRIES: u32 = 5;

/// Default base backoff between sweep retries, multiplied by the attempt number
pub const DEFAULT_SWEEP_RETRY_BACKOFF_MS: u64 = 10;

/// Matching core configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
	/// Retries after an isolation conflict before the sweep gives up
	pub sweep_max_retries: u32,
	/// Base backoff between retries in milliseconds
	pub sweep_retry_backoff_ms: u64,
	/// How pending rows are consolidated for the book view
	pub book_grouping: BookGrouping,
}

impl Default for MatchingConfig {
	fn default() -> Self {
		Self {
			sweep_max_retries: DEFAULT_SWEEP_MAX_RETRIES,
			sweep_retry_backoff_ms: DEFAULT_SWEEP_RETRY_BACKOFF_MS,
			book_grouping: BookGrouping::default(),
		}
	}
}

impl MatchingConfig {
	/// Load configuration from `MATCHING_*` environment variables
	pub fn from_env() -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::Environment::with_prefix("MATCHING"))
			.build()?;

		cfg.try_deserialize()
	}

	/// Load configuration from file, with environment overrides
	pub fn from_file(path: &str) -> Result<Self, config::ConfigError> {
		let cfg = config::Config::builder()
			.add_source(config::File::with_name(path))
			.add_source(config::Environment::with_prefix("MATCHING"))
			.build()?;

		cfg.try_deserialize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults_apply_to_missing_keys() {
		let cfg = config::Config::builder()
			.set_override("sweep_max_retries", 2)
			.unwrap()
			.build()
			.unwrap();

		let parsed: MatchingConfig = cfg.try_deserialize().unwrap();
		assert_eq!(parsed.sweep_max_retries, 2);
		assert_eq!(parsed.sweep_retry_backoff_ms, DEFAULT_SWEEP_RETRY_BACKOFF_MS);
		assert_eq!(parsed.book_grouping, BookGrouping::BuyTerms);
	}

	#[test]
	fn test_grouping_parses_from_string() {
		let cfg = config::Config::builder()
			.set_override("book_grouping", "row")
			.unwrap()
			.build()
			.unwrap();

		let parsed: MatchingConfig = cfg.try_deserialize().unwrap();
		assert_eq!(parsed.book_grouping, BookGrouping::Row);
	}
}
