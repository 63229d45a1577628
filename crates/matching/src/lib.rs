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

//! Crossbook Matching Core
//!
//! This crate pairs buy and sell interest for a single tradable quantity
//! and records the results as settled trades.
//!
//! Architecture:
//! - Order Intake classifies a submission and writes one pending row
//! - Matching Engine settles every crossing row in one store transaction
//! - Book View folds pending rows into a consolidated client snapshot
//! - All state lives behind the `OrderStore` capability (in-memory or SQLite)

pub mod config;
pub mod engine;
pub mod intake;
pub mod service;
pub mod store;
pub mod types;
pub mod view;

pub use config::MatchingConfig;
pub use engine::{EngineConfig, EngineError, MatchingEngine, SweepReport};
pub use intake::{IntakeError, IntakeOutcome, OrderIntake, Submission};
pub use service::{OrderService, SubmitReceipt, SweepStatus};
pub use store::{
	MemoryOrderStore, OrderStore, SqliteOrderStore, StoreConfig, StoreError, StoreTransaction,
};
pub use types::*;
pub use view::{BookGrouping, BookSnapshot, BookView, ConsolidatedEntry};
