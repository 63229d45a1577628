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

use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use crossbook_matching::{IntakeError, StoreError, SweepStatus};
use crossbook_sdk::types::{ErrorResponse, SubmitOrderRequest, SubmitOrderResponse};
use thiserror::Error;
use tracing::{error, warn};

use crate::server::GatewayState;

/// Error types for gateway operations
#[derive(Debug, Error)]
pub enum GatewayError {
	#[error("Invalid order data: {0}")]
	InvalidOrder(String),
	#[error("Invalid request body: {0}")]
	BadRequest(String),
	#[error("Request body too large: {0}")]
	PayloadTooLarge(String),
	#[error("Storage error: {0}")]
	Store(#[from] StoreError),
}

impl From<IntakeError> for GatewayError {
	fn from(e: IntakeError) -> Self {
		match e {
			IntakeError::InvalidOrder(reason) => GatewayError::InvalidOrder(reason),
			IntakeError::Store(e) => GatewayError::Store(e),
		}
	}
}

impl ResponseError for GatewayError {
	fn status_code(&self) -> StatusCode {
		match self {
			GatewayError::InvalidOrder(_) | GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
			GatewayError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
			GatewayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn error_response(&self) -> HttpResponse {
		HttpResponse::build(self.status_code()).json(ErrorResponse {
			message: self.to_string(),
		})
	}
}

/// Health check endpoint
///
/// Reports 503 when the order store cannot be reached.
pub async fn health(state: web::Data<GatewayState>) -> HttpResponse {
	if state.service.health_check().await {
		HttpResponse::Ok().json(serde_json::json!({
			"status": "ok",
			"service": "crossbook-gateway"
		}))
	} else {
		warn!("Health check failed: order store unreachable");
		HttpResponse::ServiceUnavailable().json(serde_json::json!({
			"status": "unavailable",
			"service": "crossbook-gateway"
		}))
	}
}

/// Handle an order submission
///
/// The response reflects the intake write only. A failed sweep after a
/// committed write is logged by the matching core and does not change the
/// status code.
pub async fn submit_order(
	state: web::Data<GatewayState>,
	request: web::Json<SubmitOrderRequest>,
) -> Result<HttpResponse, GatewayError> {
	let receipt = state.service.submit(&request).await.map_err(|e| {
		if let IntakeError::Store(store_error) = &e {
			error!(error = %store_error, "Order intake failed");
		}
		GatewayError::from(e)
	})?;

	if let SweepStatus::Failed(reason) = &receipt.sweep {
		warn!(row = receipt.outcome.row_id(), reason = %reason, "Order accepted but not swept");
	}

	Ok(HttpResponse::Ok().json(SubmitOrderResponse {
		message: receipt.message().to_string(),
	}))
}

/// Consolidated pending book plus completed trades
pub async fn list_orders(state: web::Data<GatewayState>) -> Result<HttpResponse, GatewayError> {
	let snapshot = state.service.snapshot().await.map_err(|e| {
		error!(error = %e, "Book read failed");
		GatewayError::Store(e)
	})?;

	Ok(HttpResponse::Ok().json(snapshot.into_response()))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_codes() {
		assert_eq!(
			GatewayError::InvalidOrder("x".into()).status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			GatewayError::BadRequest("x".into()).status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			GatewayError::Store(StoreError::Backend("down".into())).status_code(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}

	#[test]
	fn test_intake_errors_convert() {
		let err: GatewayError = IntakeError::InvalidOrder("no sides".into()).into();
		assert!(matches!(err, GatewayError::InvalidOrder(_)));

		let err: GatewayError = IntakeError::Store(StoreError::Conflict("busy".into())).into();
		assert!(matches!(err, GatewayError::Store(_)));
	}
}
