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

//! Gateway runtime configuration
//!
//! Settings are read from the process environment after loading an optional
//! `.env` file. Matching settings live in `crossbook_matching::MatchingConfig`.

use std::{env, net::SocketAddr, str::FromStr};

use anyhow::{Context, Result};
use crossbook_matching::StoreConfig;

// Logging configuration constants
/// Default log level (can be overridden by RUST_LOG environment variable)
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default log directory component name
pub const LOG_COMPONENT_NAME: &str = "gateway";

/// Default console output enabled (can be overridden by LOG_TO_CONSOLE environment variable)
pub const DEFAULT_LOG_TO_CONSOLE: bool = false;

// Server configuration constants
/// Default HTTP server bind address (can be overridden by CROSSBOOK_BIND_ADDR environment variable)
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default maximum HTTP request body size in bytes (can be overridden by CROSSBOOK_MAX_BODY_BYTES)
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct GatewayRuntimeConfig {
	pub bind_addr: SocketAddr,
	pub workers: usize,
	pub max_body_bytes: usize,
	pub store: StoreConfig,
}

impl GatewayRuntimeConfig {
	pub fn from_env() -> Result<Self> {
		dotenv::dotenv().ok();
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Build the configuration from an arbitrary key lookup
	///
	/// Unparseable numeric values fall back to their defaults; an unparseable
	/// bind address is an error.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let bind_addr_str =
			lookup("CROSSBOOK_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
		let bind_addr = bind_addr_str
			.parse()
			.with_context(|| format!("Invalid bind address: {}", bind_addr_str))?;

		let workers = parsed(&lookup, "CROSSBOOK_WORKERS").unwrap_or_else(num_cpus::get);

		let max_body_bytes =
			parsed(&lookup, "CROSSBOOK_MAX_BODY_BYTES").unwrap_or(DEFAULT_MAX_BODY_BYTES);

		let defaults = StoreConfig::default();
		let store = StoreConfig {
			database_url: lookup("CROSSBOOK_DATABASE_URL").unwrap_or(defaults.database_url),
			max_connections: parsed(&lookup, "CROSSBOOK_DB_MAX_CONNECTIONS")
				.unwrap_or(defaults.max_connections),
			busy_timeout_ms: parsed(&lookup, "CROSSBOOK_DB_BUSY_TIMEOUT_MS")
				.unwrap_or(defaults.busy_timeout_ms),
		};

		Ok(Self {
			bind_addr,
			workers,
			max_body_bytes,
			store,
		})
	}
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
	F: Fn(&str) -> Option<String>,
	T: FromStr,
{
	lookup(key).and_then(|v| v.parse().ok())
}
