//! Property tests for quantity conservation and crossing correctness

mod common;

use std::sync::Arc;

use crossbook_matching::{MemoryOrderStore, PendingInterest};
use crossbook_sdk::types::SubmitOrderRequest;
use proptest::prelude::*;

use common::{pending_rows, quantity_totals, service};

fn submission() -> impl Strategy<Value = SubmitOrderRequest> {
	(any::<bool>(), 1u64..20, 2u32..20).prop_map(|(is_buy, qty, half_units)| {
		let price = half_units as f64 / 2.0;
		if is_buy {
			SubmitOrderRequest::buy(qty, price)
		} else {
			SubmitOrderRequest::sell(qty, price)
		}
	})
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn conservation_holds_after_every_submission(
		requests in prop::collection::vec(submission(), 1..40)
	) {
		let runtime = tokio::runtime::Builder::new_current_thread()
			.enable_all()
			.build()
			.unwrap();

		let result: Result<(), TestCaseError> = runtime.block_on(async move {
			let memory = MemoryOrderStore::new();
			let service = service(Arc::new(memory.clone()));
			let mut bought = 0;
			let mut sold = 0;
			let mut sell_prices = Vec::new();
			let mut max_buy_price = 0.0f64;

			for request in &requests {
				service.submit(request).await.unwrap();
				bought += request.buyer_qty.unwrap_or(0);
				sold += request.seller_qty.unwrap_or(0);
				if let Some(price) = request.seller_price {
					sell_prices.push(price);
				}
				if let Some(price) = request.buyer_price {
					max_buy_price = max_buy_price.max(price);
				}

				let (traded, buying, selling) = quantity_totals(&memory).await;
				prop_assert_eq!(traded + buying, bought);
				prop_assert_eq!(traded + selling, sold);

				// Every attach is followed by a sweep, so nothing stays paired.
				let rows = pending_rows(&memory).await;
				let none_paired = rows.iter()
					.all(|r| !matches!(r.interest, PendingInterest::Paired { .. }));
				prop_assert!(none_paired);
			}

			let book = service.snapshot().await.unwrap();
			for trade in &book.completed {
				prop_assert!(sell_prices.contains(&trade.price));
				prop_assert!(trade.price <= max_buy_price);
				prop_assert!(trade.qty > 0);
			}
			Ok(())
		});
		result?;
	}
}
