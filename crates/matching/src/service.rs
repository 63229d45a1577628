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

use std::sync::Arc;

use crossbook_sdk::types::SubmitOrderRequest;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::{
	config::MatchingConfig,
	engine::{EngineConfig, EngineError, MatchingEngine, SweepReport},
	intake::{IntakeError, IntakeOutcome, OrderIntake},
	store::{OrderStore, StoreError},
	view::{BookSnapshot, BookView},
};

/// What happened to the sweep triggered by a submission
#[derive(Debug, Clone, PartialEq)]
pub enum SweepStatus {
	/// No pairing became possible, so no sweep ran
	Skipped,
	Completed(SweepReport),
	/// The sweep failed and was rolled back; the intake write still stands
	Failed(String),
}

/// Result of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
	pub outcome: IntakeOutcome,
	pub sweep: SweepStatus,
}

impl SubmitReceipt {
	pub fn message(&self) -> &'static str {
		self.outcome.message()
	}
}

/// Entry point of the matching core: submit order and read book
///
/// Intake writes and matching sweeps share one write gate, so a sweep's
/// select-then-mutate sequence never interleaves with another write. Book
/// reads do not take the gate.
pub struct OrderService {
	store: Arc<dyn OrderStore>,
	gate: Arc<Mutex<()>>,
	intake: OrderIntake,
	engine: MatchingEngine,
	view: BookView,
}

impl OrderService {
	pub fn new(store: Arc<dyn OrderStore>, config: &MatchingConfig) -> Self {
		let gate = Arc::new(Mutex::new(()));

		Self {
			intake: OrderIntake::new(store.clone()),
			engine: MatchingEngine::with_gate(
				store.clone(),
				EngineConfig::from(config),
				gate.clone(),
			),
			view: BookView::new(store.clone(), config.book_grouping),
			store,
			gate,
		}
	}

	/// Classify and record a submission, then sweep if a pairing became possible
	///
	/// The intake write and the sweep it triggers run under one hold of the
	/// write gate, so no other submission lands in between. A failing sweep
	/// does not fail the submission: the intake write has already committed.
	/// The failure is logged and reported in the receipt.
	pub async fn submit(&self, request: &SubmitOrderRequest) -> Result<SubmitReceipt, IntakeError> {
		let submission = OrderIntake::classify(request)?;

		let gate = self.gate.lock().await;
		let outcome = self.intake.record(submission).await?;
		info!(row = outcome.row_id(), "{}", outcome.message());

		let sweep = if outcome.requires_sweep() {
			match self.engine.sweep_holding(&gate).await {
				Ok(report) => SweepStatus::Completed(report),
				Err(e) => {
					error!(
						row = outcome.row_id(),
						error = %e,
						"Matching sweep failed after committed intake write"
					);
					SweepStatus::Failed(e.to_string())
				}
			}
		} else {
			SweepStatus::Skipped
		};
		drop(gate);

		Ok(SubmitReceipt { outcome, sweep })
	}

	/// Run a sweep outside of any submission
	pub async fn sweep(&self) -> Result<SweepReport, EngineError> {
		self.engine.sweep().await
	}

	/// Consolidated pending book plus the full trade ledger
	pub async fn snapshot(&self) -> Result<BookSnapshot, StoreError> {
		self.view.snapshot().await
	}

	pub async fn health_check(&self) -> bool {
		self.store.health_check().await
	}
}
