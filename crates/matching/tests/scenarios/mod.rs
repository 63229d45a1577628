//! Matching scenarios run against every store implementation

use std::sync::Arc;

use crossbook_matching::{IntakeError, IntakeOutcome, OrderStore, PendingInterest, SweepStatus};
use crossbook_sdk::types::{PendingOrderView, SubmitOrderRequest};

use crate::common::{pending_rows, seed, service, terms};

pub async fn no_false_match(store: Arc<dyn OrderStore>) {
	let service = service(store);

	service.submit(&SubmitOrderRequest::buy(10, 5.0)).await.unwrap();
	let receipt = service.submit(&SubmitOrderRequest::sell(10, 6.0)).await.unwrap();
	assert!(matches!(receipt.outcome, IntakeOutcome::SellerAdded { .. }));
	assert_eq!(receipt.sweep, SweepStatus::Skipped);

	let book = service.snapshot().await.unwrap().into_response();
	assert!(book.completed_orders.is_empty());
	assert_eq!(book.pending_orders, vec![
		PendingOrderView {
			buyer_qty: Some(10),
			buyer_price: Some(5.0),
			..PendingOrderView::default()
		},
		PendingOrderView {
			seller_price: Some(6.0),
			seller_qty: Some(10),
			..PendingOrderView::default()
		},
	]);
}

pub async fn exact_match(store: Arc<dyn OrderStore>) {
	let service = service(store);

	let buy = service.submit(&SubmitOrderRequest::buy(10, 5.0)).await.unwrap();
	assert_eq!(buy.message(), "buyer order added");

	let sell = service.submit(&SubmitOrderRequest::sell(10, 5.0)).await.unwrap();
	assert_eq!(sell.message(), "seller order matched");
	let SweepStatus::Completed(report) = sell.sweep else {
		panic!("expected a completed sweep, got {:?}", sell.sweep);
	};
	assert_eq!(report.trades.len(), 1);

	let book = service.snapshot().await.unwrap().into_response();
	assert!(book.pending_orders.is_empty());
	assert_eq!(book.completed_orders.len(), 1);
	assert_eq!(book.completed_orders[0].price, 5.0);
	assert_eq!(book.completed_orders[0].qty, 10);
}

pub async fn partial_fill_buyer_remainder(store: Arc<dyn OrderStore>) {
	let service = service(store.clone());

	service.submit(&SubmitOrderRequest::buy(10, 5.0)).await.unwrap();
	service.submit(&SubmitOrderRequest::sell(4, 5.0)).await.unwrap();

	let book = service.snapshot().await.unwrap().into_response();
	assert_eq!(book.completed_orders.len(), 1);
	assert_eq!(book.completed_orders[0].price, 5.0);
	assert_eq!(book.completed_orders[0].qty, 4);

	let rows = pending_rows(store.as_ref()).await;
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].interest, PendingInterest::BuyOnly {
		buy: terms(6, 5.0)
	});
}

/// The consumed buyer side is cleared and the row rests as sell-only
pub async fn partial_fill_seller_remainder(store: Arc<dyn OrderStore>) {
	let id = seed(store.as_ref(), PendingInterest::Paired {
		buy: terms(4, 5.0),
		sell: terms(10, 5.0),
	})
	.await;
	let service = service(store.clone());

	let report = service.sweep().await.unwrap();
	assert_eq!(report.trades.len(), 1);
	assert_eq!(report.trades[0].price, 5.0);
	assert_eq!(report.trades[0].qty, 4);

	let rows = pending_rows(store.as_ref()).await;
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].id, id);
	assert_eq!(rows[0].interest, PendingInterest::SellOnly {
		sell: terms(6, 5.0)
	});
	assert_eq!(rows[0].interest.buy(), None);
}

pub async fn idempotent_read(store: Arc<dyn OrderStore>) {
	let service = service(store);

	service.submit(&SubmitOrderRequest::buy(10, 5.0)).await.unwrap();
	service.submit(&SubmitOrderRequest::sell(4, 5.0)).await.unwrap();
	service.submit(&SubmitOrderRequest::sell(20, 9.0)).await.unwrap();

	let first = service.snapshot().await.unwrap();
	let second = service.snapshot().await.unwrap();
	assert_eq!(first, second);
}

pub async fn invalid_input_leaves_state_untouched(store: Arc<dyn OrderStore>) {
	let service = service(store.clone());

	let request = SubmitOrderRequest {
		buyer_qty: Some(10),
		seller_price: Some(5.0),
		..SubmitOrderRequest::default()
	};
	assert!(service.submit(&request).await.is_err());
	assert!(pending_rows(store.as_ref()).await.is_empty());

	// Rejected the same way by every store, before any write
	for request in [
		SubmitOrderRequest::buy(u64::MAX, 5.0),
		SubmitOrderRequest::sell(u64::MAX, 5.0),
	] {
		let err = service.submit(&request).await.unwrap_err();
		assert!(matches!(err, IntakeError::InvalidOrder(_)), "{:?}", err);
	}
	assert!(pending_rows(store.as_ref()).await.is_empty());
}

/// A buy arriving after a resting sell does not trade with it
pub async fn resting_sell_is_not_swept_by_later_buy(store: Arc<dyn OrderStore>) {
	let service = service(store.clone());

	service.submit(&SubmitOrderRequest::sell(5, 4.0)).await.unwrap();
	let receipt = service.submit(&SubmitOrderRequest::buy(5, 6.0)).await.unwrap();

	let SweepStatus::Completed(report) = receipt.sweep else {
		panic!("buy submissions always sweep");
	};
	assert!(report.trades.is_empty());
	assert_eq!(pending_rows(store.as_ref()).await.len(), 2);
}
