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
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
	store::{OrderStore, StoreError, StoreTransaction},
	types::{PendingInterest, RowId, Terms},
};

/// Error types for order intake
#[derive(Debug, Error)]
pub enum IntakeError {
	#[error("Invalid order data: {0}")]
	InvalidOrder(String),
	#[error("Storage error: {0}")]
	Store(#[from] StoreError),
}

/// A classified submission
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Submission {
	Buy(Terms),
	Sell(Terms),
}

/// What intake did with a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeOutcome {
	/// A new buy-only row was inserted
	BuyerAdded { id: RowId },
	/// The seller was attached to an existing buy-only row
	SellerMatched { id: RowId },
	/// No buy-only row could absorb the seller; a sell-only row was inserted
	SellerAdded { id: RowId },
}

impl IntakeOutcome {
	/// Whether a matching sweep may now find something to settle
	pub fn requires_sweep(&self) -> bool {
		!matches!(self, IntakeOutcome::SellerAdded { .. })
	}

	pub fn row_id(&self) -> RowId {
		match self {
			IntakeOutcome::BuyerAdded { id }
			| IntakeOutcome::SellerMatched { id }
			| IntakeOutcome::SellerAdded { id } => *id,
		}
	}

	pub fn message(&self) -> &'static str {
		match self {
			IntakeOutcome::BuyerAdded { .. } => "buyer order added",
			IntakeOutcome::SellerMatched { .. } => "seller order matched",
			IntakeOutcome::SellerAdded { .. } => "seller order added",
		}
	}
}

/// Order intake: classifies submissions and writes the pending row
pub struct OrderIntake {
	store: Arc<dyn OrderStore>,
}

impl OrderIntake {
	pub fn new(store: Arc<dyn OrderStore>) -> Self {
		Self { store }
	}

	/// Classify a raw request as buy or sell interest
	///
	/// A pair counts as supplied when both of its fields are present and
	/// non-zero. The buyer pair is checked first; seller fields sent along
	/// with a complete buyer pair are ignored.
	pub fn classify(request: &SubmitOrderRequest) -> Result<Submission, IntakeError> {
		if let Some((qty, price)) = supplied(request.buyer_qty, request.buyer_price) {
			if request.seller_qty.is_some() || request.seller_price.is_some() {
				debug!("Ignoring seller fields on a buy submission");
			}
			return terms("buyer", qty, price).map(Submission::Buy);
		}

		if let Some((qty, price)) = supplied(request.seller_qty, request.seller_price) {
			return terms("seller", qty, price).map(Submission::Sell);
		}

		Err(IntakeError::InvalidOrder(
			"expected buyer_qty and buyer_price, or seller_qty and seller_price".to_string(),
		))
	}

	/// Persist a classified submission in one transaction
	pub async fn record(&self, submission: Submission) -> Result<IntakeOutcome, StoreError> {
		let mut tx = self.store.begin().await?;

		match Self::apply(tx.as_mut(), submission).await {
			Ok(outcome) => {
				tx.commit().await?;
				debug!(?submission, ?outcome, "Intake write committed");
				Ok(outcome)
			}
			Err(e) => {
				if let Err(rollback_err) = tx.rollback().await {
					warn!(error = %rollback_err, "Intake rollback failed");
				}
				Err(e)
			}
		}
	}

	async fn apply(
		tx: &mut dyn StoreTransaction,
		submission: Submission,
	) -> Result<IntakeOutcome, StoreError> {
		match submission {
			Submission::Buy(buy) => {
				let id = tx.insert_pending(&PendingInterest::BuyOnly { buy }).await?;
				Ok(IntakeOutcome::BuyerAdded { id })
			}
			Submission::Sell(sell) => {
				let resting = tx.find_absorbing_buy(&sell).await?;

				match resting.and_then(|row| Some((row.id, row.interest.attach_seller(sell)?))) {
					Some((id, paired)) => {
						tx.update_pending(id, &paired).await?;
						Ok(IntakeOutcome::SellerMatched { id })
					}
					None => {
						let id = tx.insert_pending(&PendingInterest::SellOnly { sell }).await?;
						Ok(IntakeOutcome::SellerAdded { id })
					}
				}
			}
		}
	}
}

/// Both values present and non-zero
fn supplied(qty: Option<u64>, price: Option<f64>) -> Option<(u64, f64)> {
	match (qty, price) {
		(Some(qty), Some(price)) if qty != 0 && price != 0.0 => Some((qty, price)),
		_ => None,
	}
}

fn terms(side: &str, qty: u64, price: f64) -> Result<Terms, IntakeError> {
	Terms::new(qty, price).map_err(|e| IntakeError::InvalidOrder(format!("{} {}", side, e)))
}
