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

//! Order Store capability
//!
//! The matching core never talks to a database directly. Intake, the
//! matching engine and the book view all work through [`OrderStore`], which
//! hands out [`StoreTransaction`]s over two tables:
//!
//! - pending interest ([`PendingRow`]), readable and writable by row id
//! - completed trades ([`CompletedTrade`]), append-only
//!
//! Key semantic constraints:
//! - Every read and write happens inside a transaction
//! - A transaction that is dropped without `commit` is rolled back
//! - Row selection always returns rows in store order (ascending id)
//! - `StoreError::Conflict` signals an isolation conflict and is the only
//!   error a caller may retry

mod memory;
mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{CompletedTrade, PendingInterest, PendingRow, RowId, Terms};
pub use memory::MemoryOrderStore;
pub use sqlite::{SqliteOrderStore, StoreConfig};

/// Error types for Order Store operations
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("Transaction conflict: {0}")]
	Conflict(String),
	#[error("Storage backend error: {0}")]
	Backend(String),
	#[error("Corrupt pending row {id}: {reason}")]
	CorruptRow { id: RowId, reason: String },
	#[error("Pending row not found: {0}")]
	NotFound(RowId),
}

impl StoreError {
	pub fn is_conflict(&self) -> bool {
		matches!(self, StoreError::Conflict(_))
	}
}

/// Transactional store holding pending interest and completed trades
#[async_trait]
pub trait OrderStore: Send + Sync {
	/// Open a new transaction
	async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError>;

	/// Check whether the backend is reachable
	async fn health_check(&self) -> bool;
}

/// One atomic unit of work against the store
#[async_trait]
pub trait StoreTransaction: Send {
	/// Insert a new pending row and return its assigned id
	async fn insert_pending(&mut self, interest: &PendingInterest) -> Result<RowId, StoreError>;

	/// Overwrite an existing pending row
	async fn update_pending(
		&mut self,
		id: RowId,
		interest: &PendingInterest,
	) -> Result<(), StoreError>;

	/// Remove a pending row
	async fn delete_pending(&mut self, id: RowId) -> Result<(), StoreError>;

	/// First buy-only row that can take all of `sell` at an acceptable price
	async fn find_absorbing_buy(&mut self, sell: &Terms) -> Result<Option<PendingRow>, StoreError>;

	/// Every paired row whose buy price is at or above its sell price
	async fn crossing_rows(&mut self) -> Result<Vec<PendingRow>, StoreError>;

	/// Every pending row
	async fn pending_rows(&mut self) -> Result<Vec<PendingRow>, StoreError>;

	/// Append a settled trade to the ledger
	async fn append_trade(&mut self, price: f64, qty: u64) -> Result<CompletedTrade, StoreError>;

	/// The full trade ledger
	async fn completed_trades(&mut self) -> Result<Vec<CompletedTrade>, StoreError>;

	async fn commit(self: Box<Self>) -> Result<(), StoreError>;

	async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}
