//! Shared helpers for matching core integration tests

#![allow(dead_code)]

use std::sync::Arc;

use crossbook_matching::{
	BookGrouping, MatchingConfig, OrderService, OrderStore, PendingInterest, PendingRow, RowId,
	Terms,
};

pub fn terms(qty: u64, price: f64) -> Terms {
	Terms::new(qty, price).unwrap()
}

pub fn config(book_grouping: BookGrouping) -> MatchingConfig {
	MatchingConfig {
		sweep_max_retries: 3,
		sweep_retry_backoff_ms: 1,
		book_grouping,
	}
}

pub fn service(store: Arc<dyn OrderStore>) -> OrderService {
	OrderService::new(store, &config(BookGrouping::BuyTerms))
}

/// Insert a raw pending row through a committed transaction
pub async fn seed(store: &dyn OrderStore, interest: PendingInterest) -> RowId {
	let mut tx = store.begin().await.unwrap();
	let id = tx.insert_pending(&interest).await.unwrap();
	tx.commit().await.unwrap();
	id
}

pub async fn pending_rows(store: &dyn OrderStore) -> Vec<PendingRow> {
	let mut tx = store.begin().await.unwrap();
	let rows = tx.pending_rows().await.unwrap();
	tx.rollback().await.unwrap();
	rows
}

/// Quantity accounting per side: (traded, resting buy, resting sell)
pub async fn quantity_totals(store: &dyn OrderStore) -> (u64, u64, u64) {
	let mut tx = store.begin().await.unwrap();
	let rows = tx.pending_rows().await.unwrap();
	let trades = tx.completed_trades().await.unwrap();
	tx.rollback().await.unwrap();

	let traded = trades.iter().map(|t| t.qty).sum();
	let buying = rows
		.iter()
		.filter_map(|r| r.interest.buy())
		.map(|t| t.qty())
		.sum();
	let selling = rows
		.iter()
		.filter_map(|r| r.interest.sell())
		.map(|t| t.qty())
		.sum();
	(traded, buying, selling)
}
