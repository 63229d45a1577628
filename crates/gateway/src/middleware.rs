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

//! Request logging middleware
//!
//! Every request runs inside an `http_request` span carrying its method, path
//! and request id, so events emitted by the matching core are correlated with
//! the request that caused them. The request id is taken from `X-Request-Id`
//! when the client sends one and generated otherwise; it is echoed back on
//! the response.

use std::future::{Ready, ready};
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use actix_web::{
	Error,
	dev::{Service, ServiceRequest, ServiceResponse, Transform},
	http::header::{HeaderName, HeaderValue},
};
use tracing::{Instrument, error, info, warn};
use uuid::Uuid;

/// HTTP header name for request ID
pub const HEADER_REQUEST_ID: &str = "x-request-id";

/// Per-request identification
#[derive(Clone, Debug)]
pub struct RequestContext {
	pub request_id: String,
}

impl RequestContext {
	pub fn from_request(req: &ServiceRequest) -> Self {
		let request_id = req
			.headers()
			.get(HEADER_REQUEST_ID)
			.and_then(|v| v.to_str().ok())
			.map(str::trim)
			.filter(|v| !v.is_empty())
			.map(str::to_string)
			.unwrap_or_else(|| Uuid::new_v4().to_string());
		Self { request_id }
	}
}

/// Logging middleware for actix-web
pub struct LoggingMiddleware;

impl<S, B> Transform<S, ServiceRequest> for LoggingMiddleware
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<B>;
	type Error = Error;
	type InitError = ();
	type Transform = LoggingMiddlewareInner<S>;
	type Future = Ready<Result<Self::Transform, Self::InitError>>;

	fn new_transform(&self, service: S) -> Self::Future {
		ready(Ok(LoggingMiddlewareInner {
			service: Rc::new(service),
		}))
	}
}

pub struct LoggingMiddlewareInner<S> {
	service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for LoggingMiddlewareInner<S>
where
	S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
	S::Future: 'static,
	B: 'static,
{
	type Response = ServiceResponse<B>;
	type Error = Error;
	type Future = Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>>>>;

	fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.service.poll_ready(cx)
	}

	fn call(&self, req: ServiceRequest) -> Self::Future {
		let service = self.service.clone();
		let context = RequestContext::from_request(&req);
		let request_id = context.request_id;
		let span = tracing::info_span!(
			"http_request",
			method = %req.method(),
			path = %req.path(),
			request_id = %request_id,
		);

		Box::pin(
			async move {
				let start = std::time::Instant::now();
				let res = service.call(req).await;
				let duration = start.elapsed();

				match res {
					Ok(mut response) => {
						info!(
							status = response.status().as_u16(),
							duration_ms = duration.as_millis(),
							"Request completed"
						);
						match HeaderValue::from_str(&request_id) {
							Ok(value) => {
								response
									.headers_mut()
									.insert(HeaderName::from_static(HEADER_REQUEST_ID), value);
							}
							Err(_) => warn!("Request id is not a valid header value"),
						}
						Ok(response)
					}
					Err(e) => {
						error!(error = %e, duration_ms = duration.as_millis(), "Request failed");
						Err(e)
					}
				}
			}
			.instrument(span),
		)
	}
}
