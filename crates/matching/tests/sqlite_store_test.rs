//! Matching core against the SQLite store
//!
//! These tests verify:
//! - The matching scenarios shared with the in-memory store
//! - Schema creation on connect and persistence across reconnects
//! - Concurrent submissions through the pooled store

mod common;
mod scenarios;

use std::{
	sync::Arc,
	time::{SystemTime, UNIX_EPOCH},
};

use crossbook_matching::{OrderStore, PendingInterest, SqliteOrderStore, StoreConfig};
use crossbook_sdk::types::SubmitOrderRequest;

use common::{pending_rows, quantity_totals, seed, service, terms};

async fn store() -> Arc<dyn OrderStore> {
	Arc::new(SqliteOrderStore::in_memory().await.unwrap())
}

#[tokio::test]
async fn test_no_false_match() {
	scenarios::no_false_match(store().await).await;
}

#[tokio::test]
async fn test_exact_match() {
	scenarios::exact_match(store().await).await;
}

#[tokio::test]
async fn test_partial_fill_buyer_remainder() {
	scenarios::partial_fill_buyer_remainder(store().await).await;
}

#[tokio::test]
async fn test_partial_fill_seller_remainder() {
	scenarios::partial_fill_seller_remainder(store().await).await;
}

#[tokio::test]
async fn test_idempotent_read() {
	scenarios::idempotent_read(store().await).await;
}

#[tokio::test]
async fn test_invalid_input_leaves_state_untouched() {
	scenarios::invalid_input_leaves_state_untouched(store().await).await;
}

#[tokio::test]
async fn test_resting_sell_is_not_swept_by_later_buy() {
	scenarios::resting_sell_is_not_swept_by_later_buy(store().await).await;
}

#[tokio::test]
async fn test_rows_keep_store_order() {
	let store = store().await;
	let first = seed(store.as_ref(), PendingInterest::SellOnly {
		sell: terms(1, 2.0),
	})
	.await;
	let second = seed(store.as_ref(), PendingInterest::BuyOnly {
		buy: terms(3, 4.5),
	})
	.await;

	let rows = pending_rows(store.as_ref()).await;
	let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
	assert_eq!(ids, vec![first, second]);
	assert_eq!(rows[1].interest.buy(), Some(terms(3, 4.5)));
}

#[tokio::test]
async fn test_file_database_survives_reconnect() {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap()
		.as_nanos();
	let path = std::env::temp_dir().join(format!("crossbook-{}-{}.db", std::process::id(), nanos));
	let config = StoreConfig {
		database_url: format!("sqlite://{}", path.display()),
		..StoreConfig::default()
	};

	{
		let store: Arc<dyn OrderStore> = Arc::new(SqliteOrderStore::connect(&config).await.unwrap());
		let service = service(store);
		service.submit(&SubmitOrderRequest::buy(10, 5.0)).await.unwrap();
		service.submit(&SubmitOrderRequest::sell(4, 5.0)).await.unwrap();
	}

	let reopened: Arc<dyn OrderStore> = Arc::new(SqliteOrderStore::connect(&config).await.unwrap());
	assert!(reopened.health_check().await);

	let book = service(reopened).snapshot().await.unwrap().into_response();
	assert_eq!(book.completed_orders.len(), 1);
	assert_eq!(book.completed_orders[0].qty, 4);
	assert_eq!(book.pending_orders[0].buyer_qty, Some(6));

	for suffix in ["", "-wal", "-shm"] {
		let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_conserve_quantity() {
	let store = store().await;
	let service = Arc::new(service(store.clone()));

	let mut handles = Vec::new();
	for i in 0..30u64 {
		let service = service.clone();
		handles.push(tokio::spawn(async move {
			let request = if i % 3 == 0 {
				SubmitOrderRequest::buy(12, 5.0 + (i % 2) as f64)
			} else {
				SubmitOrderRequest::sell(1 + i % 7, 5.0)
			};
			(request.clone(), service.submit(&request).await.unwrap())
		}));
	}

	let mut bought = 0;
	let mut sold = 0;
	for handle in handles {
		let (request, _) = handle.await.unwrap();
		bought += request.buyer_qty.unwrap_or(0);
		sold += request.seller_qty.unwrap_or(0);
	}

	let (traded, buying, selling) = quantity_totals(store.as_ref()).await;
	assert_eq!(traded + buying, bought);
	assert_eq!(traded + selling, sold);
}
