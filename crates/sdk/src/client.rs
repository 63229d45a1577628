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

use std::time::Duration;

use reqwest::{Client as ReqwestClient, Response};
use thiserror::Error;

use crate::types::{ErrorResponse, OrdersResponse, SubmitOrderRequest, SubmitOrderResponse};

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
	#[error("Network error: {0}")]
	Network(String),
	#[error("Serialization error: {0}")]
	Serialization(String),
	#[error("Rejected by gateway ({status}): {message}")]
	Rejected { status: u16, message: String },
	#[error("Server error ({status}): {message}")]
	Server { status: u16, message: String },
}

/// Client for interacting with the order gateway
///
/// This is an async client interface using reqwest for HTTP communication.
pub struct Client {
	base_url: String,
	client: ReqwestClient,
}

impl Client {
	/// Create a new client with the given base URL and a 30s timeout
	pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
		Self::with_timeout(base_url, Duration::from_secs(30))
	}

	/// Create a new client with a custom request timeout
	pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
		let client = ReqwestClient::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

		Ok(Self {
			base_url: base_url.into().trim_end_matches('/').to_string(),
			client,
		})
	}

	/// Submit buy or sell interest
	pub async fn submit_order(
		&self,
		request: &SubmitOrderRequest,
	) -> Result<SubmitOrderResponse, ClientError> {
		let url = format!("{}/order", self.base_url);

		let response = self
			.client
			.post(&url)
			.json(request)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		Self::decode(response).await
	}

	/// Fetch the consolidated pending book and the completed ledger
	pub async fn orders(&self) -> Result<OrdersResponse, ClientError> {
		let url = format!("{}/orders", self.base_url);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		Self::decode(response).await
	}

	/// Check gateway health
	pub async fn health_check(&self) -> Result<bool, ClientError> {
		let url = format!("{}/health", self.base_url);

		let response = self
			.client
			.get(&url)
			.send()
			.await
			.map_err(|e| ClientError::Network(format!("Request failed: {}", e)))?;

		Ok(response.status().is_success())
	}

	async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ClientError> {
		let status = response.status();
		if !status.is_success() {
			let message = match response.json::<ErrorResponse>().await {
				Ok(body) => body.message,
				Err(_) => format!("HTTP {}", status),
			};
			return Err(if status.is_client_error() {
				ClientError::Rejected {
					status: status.as_u16(),
					message,
				}
			} else {
				ClientError::Server {
					status: status.as_u16(),
					message,
				}
			});
		}

		response
			.json()
			.await
			.map_err(|e| ClientError::Serialization(format!("Failed to parse response: {}", e)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_client_creation() {
		let client = Client::new("http://localhost:3000/").unwrap();
		assert_eq!(client.base_url, "http://localhost:3000");
	}
}
