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

use crate::types::{PendingInterest, Terms};

/// Outcome of settling one crossing row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fill {
	/// Trade price, always the seller's limit
	pub price: f64,
	/// Quantity taken from both sides
	pub qty: u64,
	/// What is left of the row, or `None` when both sides are exhausted
	pub remainder: Option<PendingInterest>,
}

/// Settle a crossing buy/sell pair held in one row
///
/// The buyer remainder takes precedence: if the buyer still wants more, the
/// row goes back to buy-only so it can attract a new seller. If instead the
/// seller has quantity left, the consumed buyer side is cleared and the row
/// becomes sell-only.
pub fn settle(buy: Terms, sell: Terms) -> Fill {
	let qty = buy.qty().min(sell.qty());

	let remainder = match (buy.with_qty(buy.qty() - qty), sell.with_qty(sell.qty() - qty)) {
		(Some(buy), _) => Some(PendingInterest::BuyOnly { buy }),
		(None, Some(sell)) => Some(PendingInterest::SellOnly { sell }),
		(None, None) => None,
	};

	Fill {
		price: sell.price(),
		qty,
		remainder,
	}
}
