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

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use crossbook_matching::OrderService;
use tracing::info;

use crate::{
	config::GatewayRuntimeConfig,
	middleware::LoggingMiddleware,
	routes::{configure_routes, json_config},
};

/// Shared handler state
#[derive(Clone)]
pub struct GatewayState {
	pub service: Arc<OrderService>,
}

impl GatewayState {
	pub fn new(service: Arc<OrderService>) -> Self {
		Self { service }
	}
}

/// App configuration shared by the server and HTTP tests
pub fn configure_app(
	state: web::Data<GatewayState>,
	max_body_bytes: usize,
) -> impl FnOnce(&mut web::ServiceConfig) {
	move |cfg| {
		cfg.app_data(state).app_data(json_config(max_body_bytes));
		configure_routes(cfg);
	}
}

/// Gateway server
pub struct GatewayServer {
	state: web::Data<GatewayState>,
	config: GatewayRuntimeConfig,
}

impl GatewayServer {
	pub fn new(service: Arc<OrderService>, config: GatewayRuntimeConfig) -> Self {
		Self {
			state: web::Data::new(GatewayState::new(service)),
			config,
		}
	}

	/// Bind and run the HTTP server until shutdown
	pub async fn serve(self) -> std::io::Result<()> {
		let state = self.state;
		let max_body_bytes = self.config.max_body_bytes;

		let server = HttpServer::new(move || {
			App::new()
				.wrap(LoggingMiddleware)
				.configure(configure_app(state.clone(), max_body_bytes))
		})
		.workers(self.config.workers)
		.bind(self.config.bind_addr)?;

		info!(
			target: "server",
			"Gateway listening on {} with {} workers",
			self.config.bind_addr,
			self.config.workers
		);

		server.run().await
	}
}
