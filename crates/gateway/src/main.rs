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

//! crossbook gateway process
//!
//! Opens the SQLite order store, builds the matching service and serves the
//! HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbook_gateway::{
	config::GatewayRuntimeConfig, logging::init_logging, server::GatewayServer,
};
use crossbook_matching::{MatchingConfig, OrderService, SqliteOrderStore};
use tracing::{info, warn};

#[actix_rt::main]
async fn main() -> Result<()> {
	// Initialize logging first
	init_logging()?;

	let config = GatewayRuntimeConfig::from_env().context("Failed to load gateway config")?;
	info!(target: "server", "Starting crossbook gateway on {}", config.bind_addr);

	let store = SqliteOrderStore::connect(&config.store)
		.await
		.with_context(|| format!("Failed to open order store at {}", config.store.database_url))?;
	info!(target: "server", "Order store ready at {}", config.store.database_url);

	let matching = MatchingConfig::from_env().unwrap_or_else(|e| {
		warn!(target: "server", error = %e, "Invalid matching config, using defaults");
		MatchingConfig::default()
	});
	let service = Arc::new(OrderService::new(Arc::new(store), &matching));

	GatewayServer::new(service, config)
		.serve()
		.await
		.context("Failed to start gateway server")?;

	Ok(())
}
