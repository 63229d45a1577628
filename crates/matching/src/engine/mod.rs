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

pub mod fill;

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::{
	config::MatchingConfig,
	store::{OrderStore, StoreError, StoreTransaction},
	types::CompletedTrade,
};

/// Error types for matching engine operations
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Storage error: {0}")]
	Store(#[from] StoreError),
	#[error("Sweep abandoned after {attempts} conflicting attempts")]
	RetriesExhausted { attempts: u32 },
}

/// Configuration for the matching engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
	pub max_retries: u32,
	pub retry_backoff: Duration,
}

impl Default for EngineConfig {
	fn default() -> Self {
		Self::from(&MatchingConfig::default())
	}
}

impl From<&MatchingConfig> for EngineConfig {
	fn from(config: &MatchingConfig) -> Self {
		Self {
			max_retries: config.sweep_max_retries,
			retry_backoff: Duration::from_millis(config.sweep_retry_backoff_ms),
		}
	}
}

/// Result of one committed sweep
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepReport {
	/// Trades appended to the ledger, in the order they were settled
	pub trades: Vec<CompletedTrade>,
	/// Transactions it took to commit, 1 when there was no conflict
	pub attempts: u32,
}

/// Matching engine running the crossing sweep over persisted state
///
/// A sweep selects every paired row whose buy price is at or above its sell
/// price, appends one trade per row at the seller's price and rewrites or
/// deletes the row, all in one store transaction.
///
/// Sweeps never interleave with each other or with intake writes sharing the
/// same write gate: the select-then-mutate sequence runs with the gate held.
/// Isolation conflicts reported by the store restart the sweep in a fresh
/// transaction.
pub struct MatchingEngine {
	store: Arc<dyn OrderStore>,
	config: EngineConfig,
	gate: Arc<Mutex<()>>,
}

impl MatchingEngine {
	pub fn new(store: Arc<dyn OrderStore>, config: EngineConfig) -> Self {
		Self::with_gate(store, config, Arc::new(Mutex::new(())))
	}

	/// Create an engine that serializes on an externally shared write gate
	pub fn with_gate(store: Arc<dyn OrderStore>, config: EngineConfig, gate: Arc<Mutex<()>>) -> Self {
		Self {
			store,
			config,
			gate,
		}
	}

	/// Settle every crossing row
	pub async fn sweep(&self) -> Result<SweepReport, EngineError> {
		let gate = self.gate.lock().await;
		self.sweep_holding(&gate).await
	}

	/// Settle every crossing row while the caller already holds the write gate
	///
	/// Lets a caller run its own write and the sweep it triggers as one
	/// critical section.
	pub async fn sweep_holding(&self, gate: &MutexGuard<'_, ()>) -> Result<SweepReport, EngineError> {
		debug_assert!(
			std::ptr::eq(MutexGuard::mutex(gate), Arc::as_ptr(&self.gate)),
			"sweep_holding called with a guard of a different gate"
		);

		let mut attempts = 0;
		loop {
			attempts += 1;
			match self.sweep_once().await {
				Ok(trades) => {
					if !trades.is_empty() {
						info!(trades = trades.len(), attempts, "Sweep committed");
					}
					return Ok(SweepReport { trades, attempts });
				}
				Err(StoreError::Conflict(reason)) if attempts <= self.config.max_retries => {
					warn!(attempts, %reason, "Sweep conflicted, retrying");
					tokio::time::sleep(self.config.retry_backoff * attempts).await;
				}
				Err(StoreError::Conflict(_)) => {
					return Err(EngineError::RetriesExhausted { attempts });
				}
				Err(e) => return Err(e.into()),
			}
		}
	}

	async fn sweep_once(&self) -> Result<Vec<CompletedTrade>, StoreError> {
		let mut tx = self.store.begin().await?;

		match Self::settle_crossing(tx.as_mut()).await {
			Ok(trades) => {
				tx.commit().await?;
				Ok(trades)
			}
			Err(e) => {
				if let Err(rollback_err) = tx.rollback().await {
					warn!(error = %rollback_err, "Sweep rollback failed");
				}
				Err(e)
			}
		}
	}

	async fn settle_crossing(
		tx: &mut dyn StoreTransaction,
	) -> Result<Vec<CompletedTrade>, StoreError> {
		let rows = tx.crossing_rows().await?;
		let mut trades = Vec::with_capacity(rows.len());

		for row in rows {
			let Some((buy, sell)) = row.interest.crossing_terms() else {
				continue;
			};

			let fill = fill::settle(buy, sell);
			debug!(
				row = row.id,
				%buy,
				%sell,
				qty = fill.qty,
				price = fill.price,
				"Settling crossing row"
			);

			trades.push(tx.append_trade(fill.price, fill.qty).await?);

			match fill.remainder {
				Some(remainder) => tx.update_pending(row.id, &remainder).await?,
				None => tx.delete_pending(row.id).await?,
			}
		}

		Ok(trades)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		store::MemoryOrderStore,
		types::{PendingInterest, Terms},
	};

	fn terms(qty: u64, price: f64) -> Terms {
		Terms::new(qty, price).unwrap()
	}

	fn engine(store: &MemoryOrderStore, max_retries: u32) -> MatchingEngine {
		MatchingEngine::new(
			Arc::new(store.clone()),
			EngineConfig {
				max_retries,
				retry_backoff: Duration::from_millis(1),
			},
		)
	}

	#[tokio::test]
	async fn test_sweep_on_empty_store_is_silent() {
		let store = MemoryOrderStore::new();
		let report = engine(&store, 0).sweep().await.unwrap();

		assert!(report.trades.is_empty());
		assert_eq!(report.attempts, 1);
	}

	#[tokio::test]
	async fn test_sweep_skips_uncrossed_pairs() {
		let store = MemoryOrderStore::new();
		store
			.seed_pending(PendingInterest::Paired {
				buy: terms(10, 5.0),
				sell: terms(10, 6.0),
			})
			.await;

		let report = engine(&store, 0).sweep().await.unwrap();
		assert!(report.trades.is_empty());

		let mut tx = store.begin().await.unwrap();
		assert_eq!(tx.pending_rows().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_sweep_settles_every_crossing_row() {
		let store = MemoryOrderStore::new();
		store
			.seed_pending(PendingInterest::Paired {
				buy: terms(10, 5.0),
				sell: terms(10, 5.0),
			})
			.await;
		let resting = store
			.seed_pending(PendingInterest::BuyOnly {
				buy: terms(3, 1.0),
			})
			.await;
		let partial = store
			.seed_pending(PendingInterest::Paired {
				buy: terms(8, 7.0),
				sell: terms(5, 6.5),
			})
			.await;

		let report = engine(&store, 0).sweep().await.unwrap();
		let settled: Vec<_> = report.trades.iter().map(|t| (t.price, t.qty)).collect();
		assert_eq!(settled, vec![(5.0, 10), (6.5, 5)]);

		let mut tx = store.begin().await.unwrap();
		let rows = tx.pending_rows().await.unwrap();
		let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
		assert_eq!(ids, vec![resting, partial]);
		assert_eq!(rows[1].interest, PendingInterest::BuyOnly {
			buy: terms(3, 7.0)
		});
	}

	#[tokio::test]
	async fn test_sweep_retries_on_conflict() {
		let store = MemoryOrderStore::new();
		store
			.seed_pending(PendingInterest::Paired {
				buy: terms(2, 5.0),
				sell: terms(2, 5.0),
			})
			.await;
		store.inject_conflicts(2);

		let report = engine(&store, 3).sweep().await.unwrap();
		assert_eq!(report.attempts, 3);
		assert_eq!(report.trades.len(), 1);

		let mut tx = store.begin().await.unwrap();
		assert_eq!(tx.completed_trades().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_sweep_gives_up_after_max_retries() {
		let store = MemoryOrderStore::new();
		store
			.seed_pending(PendingInterest::Paired {
				buy: terms(2, 5.0),
				sell: terms(2, 5.0),
			})
			.await;
		store.inject_conflicts(5);

		let err = engine(&store, 1).sweep().await.unwrap_err();
		assert!(matches!(err, EngineError::RetriesExhausted { attempts: 2 }));

		let mut tx = store.begin().await.unwrap();
		assert!(tx.completed_trades().await.unwrap().is_empty());
		assert_eq!(tx.pending_rows().await.unwrap().len(), 1);
	}

	#[tokio::test]
	async fn test_storage_failure_rolls_back_whole_sweep() {
		let store = MemoryOrderStore::new();
		let row = PendingInterest::Paired {
			buy: terms(2, 5.0),
			sell: terms(2, 5.0),
		};
		store.seed_pending(row).await;
		store.fail_trade_appends(true);

		let err = engine(&store, 3).sweep().await.unwrap_err();
		assert!(matches!(err, EngineError::Store(StoreError::Backend(_))));

		let mut tx = store.begin().await.unwrap();
		assert!(tx.completed_trades().await.unwrap().is_empty());
		assert_eq!(tx.pending_rows().await.unwrap()[0].interest, row);
	}
}
