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

//! Logging initialization for the gateway process
//!
//! # Configuration
//!
//! - `RUST_LOG`: Log level filter (default: `info`)
//!   - Can be set per module: `RUST_LOG=crossbook_matching=debug,sqlx::query=debug`
//!
//! - `LOG_DIR`: Root directory for log files (default: `{workspace_root}/logs`)
//!   - Log files are created in `{LOG_DIR}/gateway/`
//!
//! - `LOG_TO_CONSOLE`: Mirror logs to stderr with ANSI colors (default: `false`)
//!   - `true`, `1` or `yes` enable it
//!
//! # Log File Format
//!
//! - Rotation: one file per day (UTC), e.g. `gateway.2026-01-03.log`
//! - Format: UTC timestamp, thread ID, log level, target, message

use std::{
	env,
	path::{Path, PathBuf},
	sync::OnceLock,
};

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::{
	non_blocking,
	rolling::{self, Rotation},
};
use tracing_subscriber::{
	EnvFilter, fmt, layer::SubscriberExt, registry::Registry, util::SubscriberInitExt,
};

use crate::config::{DEFAULT_LOG_LEVEL, DEFAULT_LOG_TO_CONSOLE, LOG_COMPONENT_NAME};

// Flushes buffered lines on exit
static LOG_GUARD: OnceLock<non_blocking::WorkerGuard> = OnceLock::new();

/// Walk up from the crate (or current) directory to the workspace root
fn find_workspace_root() -> PathBuf {
	let start = env::var("CARGO_MANIFEST_DIR")
		.map(PathBuf::from)
		.or_else(|_| env::current_dir())
		.unwrap_or_else(|_| PathBuf::from("."));

	let mut current = start.clone();
	loop {
		if let Ok(content) = std::fs::read_to_string(current.join("Cargo.toml"))
			&& content.contains("[workspace]")
		{
			return current;
		}
		match current.parent() {
			Some(parent) => current = parent.to_path_buf(),
			None => return start,
		}
	}
}

fn log_root() -> PathBuf {
	env::var("LOG_DIR")
		.map(PathBuf::from)
		.unwrap_or_else(|_| find_workspace_root().join("logs"))
}

fn console_enabled(value: Option<&str>) -> bool {
	value
		.map(|v| matches!(v, "true" | "1" | "yes"))
		.unwrap_or(DEFAULT_LOG_TO_CONSOLE)
}

/// Daily rolling `{component}.{date}.log` appender behind a non-blocking writer
fn setup_file_logging(log_dir: &Path) -> Result<non_blocking::NonBlocking> {
	let file_appender = rolling::RollingFileAppender::builder()
		.rotation(Rotation::DAILY)
		.filename_prefix(LOG_COMPONENT_NAME.to_string())
		.filename_suffix("log")
		.build(log_dir)
		.with_context(|| {
			format!(
				"Failed to create rolling file appender in {}",
				log_dir.display()
			)
		})?;

	let (file_writer, guard) = non_blocking(file_appender);
	LOG_GUARD.set(guard).ok();

	Ok(file_writer)
}

/// Initialize logging with file output and optional console output
///
/// See module-level documentation for environment variable configuration.
pub fn init_logging() -> Result<()> {
	dotenv::dotenv().ok();

	let log_level = env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

	let log_dir = log_root().join(LOG_COMPONENT_NAME);
	std::fs::create_dir_all(&log_dir)
		.with_context(|| format!("Failed to create log directory: {}", log_dir.display()))?;

	let file_writer = setup_file_logging(&log_dir)?;
	let log_to_console = console_enabled(env::var("LOG_TO_CONSOLE").ok().as_deref());

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_level));

	let file_layer = fmt::layer()
		.with_writer(file_writer)
		.with_timer(fmt::time::UtcTime::rfc_3339())
		.with_thread_ids(true)
		.with_target(true)
		.with_thread_names(false)
		.with_ansi(false);

	let console_layer = log_to_console.then(|| {
		fmt::layer()
			.with_writer(std::io::stderr)
			.with_timer(fmt::time::UtcTime::rfc_3339())
			.with_thread_ids(true)
			.with_target(true)
			.with_thread_names(false)
			.with_ansi(true)
	});

	Registry::default()
		.with(filter)
		.with(file_layer)
		.with(console_layer)
		.try_init()
		.context("Failed to install tracing subscriber")?;

	info!(target: "server", "Log level: {}", log_level);
	info!(target: "server", "Log directory: {}", log_dir.display());
	info!(
		target: "server",
		"Log file base name: {}.YYYY-MM-DD.log (daily rolling)",
		LOG_COMPONENT_NAME
	);
	if log_to_console {
		info!(target: "server", "Console output: enabled");
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_console_flag_values() {
		assert!(console_enabled(Some("true")));
		assert!(console_enabled(Some("1")));
		assert!(console_enabled(Some("yes")));
		assert!(!console_enabled(Some("no")));
		assert_eq!(console_enabled(None), DEFAULT_LOG_TO_CONSOLE);
	}

	#[test]
	fn test_workspace_root_has_workspace_manifest() {
		let root = find_workspace_root();
		let manifest = std::fs::read_to_string(root.join("Cargo.toml")).unwrap();
		assert!(manifest.contains("[workspace]"));
	}
}
