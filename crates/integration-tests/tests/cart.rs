//! Integration tests for the cart view.
//!
//! Run with: cargo test -p shopfront-integration-tests --test cart

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use serde_json::json;
use shopfront_core::{CartError, CartItemId, Price};
use shopfront_integration_tests::{MockApi, ProductRow};
use shopfront_storefront::{CartView, QuantityOutcome, Storefront, StorefrontError};

/// A signed-in `alice` with three line items: 5x2, 3x1 and 7x4.
async fn filled_cart() -> (MockApi, Storefront, [CartItemId; 3]) {
    let api = MockApi::start().await.unwrap();
    api.add_product(ProductRow::new(1, "Mug", "5", Some("Kitchen"), 4.0));
    api.add_product(ProductRow::new(2, "Spoon", "3", Some("Kitchen"), 3.5));
    api.add_product(ProductRow::new(3, "Teapot", "7", Some("Tea"), 4.8));

    let storefront = api.signed_in("alice", false).await;
    let ids = [
        CartItemId::new(api.add_cart_item("alice", 1, 2)),
        CartItemId::new(api.add_cart_item("alice", 2, 1)),
        CartItemId::new(api.add_cart_item("alice", 3, 4)),
    ];
    api.clear_requests();
    (api, storefront, ids)
}

fn quantities(view: &CartView) -> Vec<(CartItemId, u32)> {
    view.items().iter().map(|i| (i.id, i.quantity)).collect()
}

#[tokio::test]
async fn test_load_requires_login() {
    let api = MockApi::start().await.unwrap();
    let err = CartView::load(&api.storefront()).await.unwrap_err();

    assert!(matches!(err, StorefrontError::LoginRequired));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_total_is_sum_of_line_totals() {
    let api = MockApi::start().await.unwrap();
    api.add_product(ProductRow::new(1, "Mug", "5", None, 4.0));
    api.add_product(ProductRow::new(2, "Spoon", "3", None, 3.0));
    let storefront = api.signed_in("alice", false).await;
    api.add_cart_item("alice", 1, 2);
    api.add_cart_item("alice", 2, 1);

    let view = CartView::load(&storefront).await.unwrap();

    assert_eq!(view.total(), Price::from_units(13));
    assert_eq!(view.line_count(), 2);
}

#[tokio::test]
async fn test_decrement_from_one_sends_nothing() {
    let (api, storefront, [_, spoon, _]) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();
    let before = quantities(&view);
    api.clear_requests();

    let outcome = view.decrement(spoon).await.unwrap();

    assert_eq!(
        outcome,
        QuantityOutcome::Rejected(CartError::NonPositiveQuantity(0))
    );
    assert!(api.requests().is_empty());
    assert_eq!(quantities(&view), before);
}

#[tokio::test]
async fn test_non_positive_quantities_send_nothing() {
    let (api, storefront, [mug, _, _]) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();
    api.clear_requests();

    for target in [0, -1, -50] {
        let outcome = view.set_quantity(mug, target).await.unwrap();
        assert!(matches!(outcome, QuantityOutcome::Rejected(_)));
    }

    assert!(api.requests().is_empty());
    assert_eq!(view.total(), Price::from_units(41));
}

#[tokio::test]
async fn test_unknown_item_sends_nothing() {
    let (api, storefront, _) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();
    api.clear_requests();

    let outcome = view.increment(CartItemId::new(999)).await.unwrap();

    assert_eq!(
        outcome,
        QuantityOutcome::Rejected(CartError::UnknownItem(CartItemId::new(999)))
    );
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_increment_patches_and_replaces_in_place() {
    let (api, storefront, [mug, spoon, teapot]) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();

    let outcome = view.increment(spoon).await.unwrap();

    let QuantityOutcome::Updated(item) = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(item.quantity, 2);

    let patches = api.requests_to("PATCH", &format!("/cart/item/{spoon}/"));
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, Some(json!({"quantity": 2})));

    assert_eq!(quantities(&view), vec![(mug, 2), (spoon, 2), (teapot, 4)]);
    assert_eq!(view.total(), Price::from_units(44));
}

#[tokio::test]
async fn test_set_quantity_updates_server_and_local_state() {
    let (api, storefront, [mug, spoon, teapot]) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();

    view.set_quantity(teapot, 1).await.unwrap();

    assert_eq!(quantities(&view), vec![(mug, 2), (spoon, 1), (teapot, 1)]);
    assert_eq!(
        api.cart_quantities("alice"),
        vec![
            (mug.as_i64(), 2),
            (spoon.as_i64(), 1),
            (teapot.as_i64(), 1)
        ]
    );
}

#[tokio::test]
async fn test_failed_update_leaves_local_state() {
    let (api, storefront, [mug, _, _]) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();
    let before = quantities(&view);
    api.fail("PATCH", &format!("/cart/item/{mug}/"));

    let err = view.increment(mug).await.unwrap_err();

    assert!(matches!(err, StorefrontError::Api(_)));
    assert_eq!(quantities(&view), before);
}

#[tokio::test]
async fn test_remove_preserves_other_items() {
    let (api, storefront, [mug, spoon, teapot]) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();

    let removed = view.remove(spoon).await.unwrap();

    assert_eq!(removed.product.name, "Spoon");
    assert_eq!(quantities(&view), vec![(mug, 2), (teapot, 4)]);
    assert_eq!(api.requests_to("DELETE", &format!("/cart/item/{spoon}/")).len(), 1);
    assert_eq!(view.total(), Price::from_units(38));
}

#[tokio::test]
async fn test_mutations_invalidate_the_cached_cart() {
    let (api, storefront, [mug, _, _]) = filled_cart().await;
    let mut view = CartView::load(&storefront).await.unwrap();
    view.remove(mug).await.unwrap();

    let reloaded = CartView::load(&storefront).await.unwrap();

    assert_eq!(reloaded.line_count(), 2);
    assert_eq!(api.requests_to("GET", "/cart/").len(), 2);
}
