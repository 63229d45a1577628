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

use actix_web::{error::JsonPayloadError, web};

use crate::handlers::{self, GatewayError};

/// Configure API routes for the gateway
///
/// - `POST /order` - submit buy or sell interest
/// - `GET /orders` - consolidated pending book and completed trades
/// - `GET /health` - health check
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
	cfg.route("/order", web::post().to(handlers::submit_order))
		.route("/orders", web::get().to(handlers::list_orders))
		.route("/health", web::get().to(handlers::health));
}

/// JSON extractor settings: body size limit and `{"message"}` error bodies
pub fn json_config(max_body_bytes: usize) -> web::JsonConfig {
	web::JsonConfig::default()
		.limit(max_body_bytes)
		.error_handler(|err, _req| {
			let gateway_error = match err {
				JsonPayloadError::OverflowKnownLength { .. } | JsonPayloadError::Overflow { .. } => {
					GatewayError::PayloadTooLarge(err.to_string())
				}
				other => GatewayError::BadRequest(other.to_string()),
			};
			gateway_error.into()
		})
}
