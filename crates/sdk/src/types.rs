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

/// Request to submit buy or sell interest
///
/// Every field is optional on the wire. A submission is a buy when both
/// buyer fields are present and non-zero, otherwise a sell when both seller
/// fields are present and non-zero. Anything else is rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitOrderRequest {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub buyer_qty: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub buyer_price: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub seller_price: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub seller_qty: Option<u64>,
}

impl SubmitOrderRequest {
	/// Buy interest for `qty` units at up to `price`
	pub fn buy(qty: u64, price: f64) -> Self {
		Self {
			buyer_qty: Some(qty),
			buyer_price: Some(price),
			..Self::default()
		}
	}

	/// Sell interest for `qty` units at no less than `price`
	pub fn sell(qty: u64, price: f64) -> Self {
		Self {
			seller_qty: Some(qty),
			seller_price: Some(price),
			..Self::default()
		}
	}
}

/// Response from submitting an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOrderResponse {
	/// Short status message, e.g. "buyer order added"
	pub message: String,
}

/// Error body returned with 4xx/5xx statuses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub message: String,
}

/// One consolidated entry of outstanding interest
///
/// Sides that are not populated are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingOrderView {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub buyer_qty: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub buyer_price: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub seller_price: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub seller_qty: Option<u64>,
}

/// Settled trade from the completed ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedOrderView {
	pub id: i64,
	pub price: f64,
	pub qty: u64,
}

/// Snapshot of the book returned by `GET /orders`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrdersResponse {
	#[serde(rename = "pendingOrders")]
	pub pending_orders: Vec<PendingOrderView>,
	#[serde(rename = "completedOrders")]
	pub completed_orders: Vec<CompletedOrderView>,
}
