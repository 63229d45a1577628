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

//! Book View
//!
//! Builds the client-facing snapshot of outstanding interest. With the
//! default [`BookGrouping::BuyTerms`], pending rows that carry the same buyer
//! quantity and price are presented as one logical order: a buy-only row and
//! a paired row for the same buy terms show up as a single entry with the
//! seller terms filled in. This is a display convenience only; matching never
//! looks at it.
//!
//! Folding rules for `BuyTerms`:
//! - rows are folded in store order
//! - a row joins the first entry with identical buy terms, unless that entry
//!   already has seller terms and the row has none
//! - seller terms of a joining row overwrite the entry's seller terms
//! - sell-only rows are never merged; each resting sell keeps its own entry
//!   instead of collapsing into the first sell-only row with its terms
//!   overwritten
//!
//! Two distinct resting buys with identical terms are shown as one entry.
//! Use [`BookGrouping::Row`] when every row must stay visible.

use std::sync::Arc;

use crossbook_sdk::types::{CompletedOrderView, OrdersResponse, PendingOrderView};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
	store::{OrderStore, StoreError},
	types::{CompletedTrade, PendingInterest, PendingRow, Terms},
};

/// How pending rows are consolidated into book entries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookGrouping {
	/// Merge rows sharing buyer quantity and price
	#[default]
	BuyTerms,
	/// One entry per pending row
	Row,
}

/// One entry of the consolidated pending book
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsolidatedEntry {
	pub buy: Option<Terms>,
	pub sell: Option<Terms>,
}

impl From<PendingInterest> for ConsolidatedEntry {
	fn from(interest: PendingInterest) -> Self {
		Self {
			buy: interest.buy(),
			sell: interest.sell(),
		}
	}
}

impl From<&ConsolidatedEntry> for PendingOrderView {
	fn from(entry: &ConsolidatedEntry) -> Self {
		Self {
			buyer_qty: entry.buy.map(|t| t.qty()),
			buyer_price: entry.buy.map(|t| t.price()),
			seller_price: entry.sell.map(|t| t.price()),
			seller_qty: entry.sell.map(|t| t.qty()),
		}
	}
}

/// Point-in-time view of the book
#[derive(Debug, Clone, PartialEq)]
pub struct BookSnapshot {
	pub pending: Vec<ConsolidatedEntry>,
	pub completed: Vec<CompletedTrade>,
}

impl BookSnapshot {
	pub fn into_response(self) -> OrdersResponse {
		OrdersResponse {
			pending_orders: self.pending.iter().map(PendingOrderView::from).collect(),
			completed_orders: self
				.completed
				.into_iter()
				.map(|trade| CompletedOrderView {
					id: trade.id,
					price: trade.price,
					qty: trade.qty,
				})
				.collect(),
		}
	}
}

/// Fold pending rows into book entries
pub fn consolidate(rows: &[PendingRow], grouping: BookGrouping) -> Vec<ConsolidatedEntry> {
	let mut entries: Vec<ConsolidatedEntry> = Vec::with_capacity(rows.len());

	for row in rows {
		let entry = ConsolidatedEntry::from(row.interest);

		let existing = match (grouping, entry.buy) {
			(BookGrouping::BuyTerms, Some(buy)) => entries
				.iter_mut()
				.find(|e| e.buy == Some(buy) && (e.sell.is_none() || entry.sell.is_some())),
			_ => None,
		};

		match existing {
			Some(existing) => {
				if entry.sell.is_some() {
					existing.sell = entry.sell;
				}
			}
			None => entries.push(entry),
		}
	}

	entries
}

/// Read-only view over pending interest and the trade ledger
pub struct BookView {
	store: Arc<dyn OrderStore>,
	grouping: BookGrouping,
}

impl BookView {
	pub fn new(store: Arc<dyn OrderStore>, grouping: BookGrouping) -> Self {
		Self { store, grouping }
	}

	/// Read both tables in one transaction and consolidate the pending rows
	pub async fn snapshot(&self) -> Result<BookSnapshot, StoreError> {
		let mut tx = self.store.begin().await?;
		let rows = tx.pending_rows().await?;
		let completed = tx.completed_trades().await?;

		if let Err(e) = tx.rollback().await {
			warn!(error = %e, "Failed to release book snapshot transaction");
		}

		Ok(BookSnapshot {
			pending: consolidate(&rows, self.grouping),
			completed,
		})
	}
}
