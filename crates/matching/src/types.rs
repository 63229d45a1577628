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

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Store-assigned row identifier; store order is ascending id
pub type RowId = i64;

/// Largest quantity a side may carry; stores keep quantities as signed 64-bit integers
pub const MAX_QTY: u64 = i64::MAX as u64;

/// Error returned when quantity/price terms are not tradable
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TermsError {
	#[error("quantity must be greater than zero")]
	ZeroQuantity,
	#[error("quantity {0} exceeds the maximum of {max}", max = MAX_QTY)]
	QuantityOutOfRange(u64),
	#[error("price must be a finite number greater than zero, got {0}")]
	InvalidPrice(f64),
}

/// One populated side of a pending entry: a quantity with its limit price
///
/// Price and quantity only exist together, so a side can never carry a
/// price without a quantity or the reverse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Terms {
	qty: u64,
	price: f64,
}

impl Terms {
	pub fn new(qty: u64, price: f64) -> Result<Self, TermsError> {
		if qty == 0 {
			return Err(TermsError::ZeroQuantity);
		}
		if qty > MAX_QTY {
			return Err(TermsError::QuantityOutOfRange(qty));
		}
		if !price.is_finite() || price <= 0.0 {
			return Err(TermsError::InvalidPrice(price));
		}
		Ok(Self { qty, price })
	}

	pub fn qty(&self) -> u64 {
		self.qty
	}

	pub fn price(&self) -> f64 {
		self.price
	}

	/// Same price, reduced quantity. Returns `None` when nothing is left.
	pub fn with_qty(&self, qty: u64) -> Option<Self> {
		(qty > 0).then_some(Self {
			qty,
			price: self.price,
		})
	}
}

impl fmt::Display for Terms {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} @ {}", self.qty, self.price)
	}
}

/// Outstanding, unsettled interest held in one pending row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PendingInterest {
	/// Resting buy with no counterpart yet
	BuyOnly { buy: Terms },
	/// Resting sell with no counterpart yet
	SellOnly { sell: Terms },
	/// Seller attached to a buy row, not yet swept
	Paired { buy: Terms, sell: Terms },
}

impl PendingInterest {
	pub fn buy(&self) -> Option<Terms> {
		match self {
			PendingInterest::BuyOnly { buy } | PendingInterest::Paired { buy, .. } => Some(*buy),
			PendingInterest::SellOnly { .. } => None,
		}
	}

	pub fn sell(&self) -> Option<Terms> {
		match self {
			PendingInterest::SellOnly { sell } | PendingInterest::Paired { sell, .. } => {
				Some(*sell)
			}
			PendingInterest::BuyOnly { .. } => None,
		}
	}

	/// Rebuild an entry from optional sides, as read back from a store
	pub fn from_sides(buy: Option<Terms>, sell: Option<Terms>) -> Option<Self> {
		match (buy, sell) {
			(Some(buy), Some(sell)) => Some(PendingInterest::Paired { buy, sell }),
			(Some(buy), None) => Some(PendingInterest::BuyOnly { buy }),
			(None, Some(sell)) => Some(PendingInterest::SellOnly { sell }),
			(None, None) => None,
		}
	}

	/// Whether this is a resting buy able to take all of `sell` at its price
	pub fn can_absorb(&self, sell: &Terms) -> bool {
		match self {
			PendingInterest::BuyOnly { buy } => buy.price >= sell.price && buy.qty >= sell.qty,
			_ => false,
		}
	}

	/// Both sides of a paired row whose buy price is at or above its sell price
	pub fn crossing_terms(&self) -> Option<(Terms, Terms)> {
		match self {
			PendingInterest::Paired { buy, sell } if buy.price >= sell.price => Some((*buy, *sell)),
			_ => None,
		}
	}

	/// Attach seller terms to a buy-only row
	///
	/// Returns `None` if the row already carries a seller.
	pub fn attach_seller(&self, sell: Terms) -> Option<Self> {
		match self {
			PendingInterest::BuyOnly { buy } => Some(PendingInterest::Paired { buy: *buy, sell }),
			_ => None,
		}
	}
}

/// A pending entry together with its store identifier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingRow {
	pub id: RowId,
	pub interest: PendingInterest,
}

/// Append-only ledger entry written by a matching sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletedTrade {
	pub id: RowId,
	pub price: f64,
	pub qty: u64,
}
