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

use std::{
	collections::BTreeMap,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicU32, Ordering},
	},
};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::{OrderStore, StoreError, StoreTransaction};
use crate::types::{CompletedTrade, PendingInterest, PendingRow, RowId, Terms};

/// In-memory implementation of the Order Store
///
/// Both tables live behind a single async mutex. A transaction holds the
/// lock for its whole lifetime and works on a private copy of the tables,
/// which `commit` publishes. Transactions are therefore fully serialized and
/// a dropped transaction leaves no trace.
///
/// Characteristics:
/// - No durability
/// - Store order is ascending row id, ids are never reused
/// - Fault injection hooks for exercising conflict and failure paths
#[derive(Clone, Default)]
pub struct MemoryOrderStore {
	tables: Arc<Mutex<Tables>>,
	faults: Arc<Faults>,
}

#[derive(Debug, Clone, Default)]
struct Tables {
	pending: BTreeMap<RowId, PendingInterest>,
	completed: Vec<CompletedTrade>,
	last_pending_id: RowId,
	last_completed_id: RowId,
}

impl Tables {
	fn insert_pending(&mut self, interest: PendingInterest) -> RowId {
		self.last_pending_id += 1;
		self.pending.insert(self.last_pending_id, interest);
		self.last_pending_id
	}

	fn rows_where(&self, predicate: impl Fn(&PendingInterest) -> bool) -> Vec<PendingRow> {
		self.pending
			.iter()
			.filter(|(_, interest)| predicate(interest))
			.map(|(id, interest)| PendingRow {
				id: *id,
				interest: *interest,
			})
			.collect()
	}
}

#[derive(Debug, Default)]
struct Faults {
	conflicts: AtomicU32,
	fail_trade_appends: AtomicBool,
}

impl Faults {
	fn take_conflict(&self) -> bool {
		self.conflicts
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok()
	}
}

impl MemoryOrderStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Make the next `count` commits fail with `StoreError::Conflict`
	pub fn inject_conflicts(&self, count: u32) {
		self.faults.conflicts.store(count, Ordering::SeqCst);
	}

	/// Make every `append_trade` fail with a backend error while enabled
	pub fn fail_trade_appends(&self, enabled: bool) {
		self.faults
			.fail_trade_appends
			.store(enabled, Ordering::SeqCst);
	}

	/// Insert a pending row directly, bypassing intake
	pub async fn seed_pending(&self, interest: PendingInterest) -> RowId {
		self.tables.lock().await.insert_pending(interest)
	}
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
	async fn begin(&self) -> Result<Box<dyn StoreTransaction>, StoreError> {
		let guard = self.tables.clone().lock_owned().await;
		let working = guard.clone();
		Ok(Box::new(MemoryTransaction {
			guard,
			working,
			faults: self.faults.clone(),
		}))
	}

	async fn health_check(&self) -> bool {
		true
	}
}

struct MemoryTransaction {
	guard: OwnedMutexGuard<Tables>,
	working: Tables,
	faults: Arc<Faults>,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
	async fn insert_pending(&mut self, interest: &PendingInterest) -> Result<RowId, StoreError> {
		Ok(self.working.insert_pending(*interest))
	}

	async fn update_pending(
		&mut self,
		id: RowId,
		interest: &PendingInterest,
	) -> Result<(), StoreError> {
		match self.working.pending.get_mut(&id) {
			Some(row) => {
				*row = *interest;
				Ok(())
			}
			None => Err(StoreError::NotFound(id)),
		}
	}

	async fn delete_pending(&mut self, id: RowId) -> Result<(), StoreError> {
		self.working
			.pending
			.remove(&id)
			.map(|_| ())
			.ok_or(StoreError::NotFound(id))
	}

	async fn find_absorbing_buy(&mut self, sell: &Terms) -> Result<Option<PendingRow>, StoreError> {
		Ok(self
			.working
			.rows_where(|interest| interest.can_absorb(sell))
			.into_iter()
			.next())
	}

	async fn crossing_rows(&mut self) -> Result<Vec<PendingRow>, StoreError> {
		Ok(self
			.working
			.rows_where(|interest| interest.crossing_terms().is_some()))
	}

	async fn pending_rows(&mut self) -> Result<Vec<PendingRow>, StoreError> {
		Ok(self.working.rows_where(|_| true))
	}

	async fn append_trade(&mut self, price: f64, qty: u64) -> Result<CompletedTrade, StoreError> {
		if self.faults.fail_trade_appends.load(Ordering::SeqCst) {
			return Err(StoreError::Backend(
				"completed trade insert rejected".to_string(),
			));
		}

		self.working.last_completed_id += 1;
		let trade = CompletedTrade {
			id: self.working.last_completed_id,
			price,
			qty,
		};
		self.working.completed.push(trade);
		Ok(trade)
	}

	async fn completed_trades(&mut self) -> Result<Vec<CompletedTrade>, StoreError> {
		Ok(self.working.completed.clone())
	}

	async fn commit(self: Box<Self>) -> Result<(), StoreError> {
		if self.faults.take_conflict() {
			return Err(StoreError::Conflict(
				"concurrent update detected at commit".to_string(),
			));
		}

		let MemoryTransaction {
			mut guard, working, ..
		} = *self;
		*guard = working;
		Ok(())
	}

	async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
		Ok(())
	}
}
