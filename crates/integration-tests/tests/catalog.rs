//! Integration tests for the catalog view.
//!
//! Run with: cargo test -p shopfront-integration-tests --test catalog

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use shopfront_core::{FilterCriteria, Price, ProductId};
use shopfront_integration_tests::{MockApi, ProductRow};
use shopfront_storefront::{CartView, CatalogView, StorefrontError};

async fn stocked_api() -> MockApi {
    let api = MockApi::start().await.unwrap();
    api.add_product(ProductRow::new(1, "Mug", "10.00", Some("A"), 4.0));
    api.add_product(ProductRow::new(2, "Teapot", "20.00", Some("B"), 3.0));
    api.add_product(ProductRow::new(3, "Kettle", "35.50", Some("A"), 4.6));
    api.add_product(ProductRow::new(4, "Gift card", "15.00", None, 5.0));
    api
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_anonymous_load_lists_products_and_categories() {
    let api = stocked_api().await;
    let storefront = api.storefront();

    let catalog = CatalogView::load(&storefront).await.unwrap();

    assert_eq!(catalog.products().len(), 4);
    assert_eq!(catalog.categories(), ["A".to_string(), "B".to_string()]);
    assert!(!catalog.is_admin());
    assert!(catalog.profile().is_none());

    let requests = api.requests_to("GET", "/products/");
    assert_eq!(requests.len(), 1);
    assert!(requests[0].authorization.is_none());
    assert!(api.requests_to("GET", "/profile/").is_empty());
}

#[tokio::test]
async fn test_signed_in_load_sends_bearer_token_and_learns_admin() {
    let api = stocked_api().await;
    let storefront = api.signed_in("root", true).await;

    let catalog = CatalogView::load(&storefront).await.unwrap();

    assert!(catalog.is_admin());
    let requests = api.requests_to("GET", "/products/");
    assert!(
        requests[0]
            .authorization
            .as_deref()
            .unwrap()
            .starts_with("Bearer ")
    );
}

#[tokio::test]
async fn test_products_are_read_through_the_shared_cache() {
    let api = stocked_api().await;
    let storefront = api.storefront();

    CatalogView::load(&storefront).await.unwrap();
    CatalogView::load(&storefront).await.unwrap();

    assert_eq!(api.requests_to("GET", "/products/").len(), 1);
}

#[tokio::test]
async fn test_failed_load_is_an_error() {
    let api = stocked_api().await;
    api.fail("GET", "/products/");

    let err = CatalogView::load(&api.storefront()).await.unwrap_err();
    assert!(matches!(err, StorefrontError::Api(_)));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_products() {
    let api = stocked_api().await;
    let mut catalog = CatalogView::load(&api.storefront()).await.unwrap();

    api.fail("GET", "/products/");
    assert!(catalog.refresh().await.is_err());

    assert_eq!(catalog.products().len(), 4);
    assert_eq!(api.requests_to("GET", "/products/").len(), 2);
}

#[tokio::test]
async fn test_profile_failure_means_not_admin() {
    let api = stocked_api().await;
    // Sign in while the profile endpoint is down, so nothing is cached.
    api.fail("GET", "/profile/");
    let storefront = api.signed_in("root", true).await;

    let catalog = CatalogView::load(&storefront).await.unwrap();

    assert!(!catalog.is_admin());
    assert_eq!(catalog.products().len(), 4);
}

// ============================================================================
// Filtering and pagination
// ============================================================================

#[tokio::test]
async fn test_min_price_filter() {
    let api = MockApi::start().await.unwrap();
    api.add_product(ProductRow::new(1, "Mug", "10", Some("A"), 4.0));
    api.add_product(ProductRow::new(2, "Teapot", "20", Some("B"), 3.0));
    let mut catalog = CatalogView::load(&api.storefront()).await.unwrap();

    catalog.set_criteria(FilterCriteria::default().with_min_price(Price::from_units(15)));

    let visible = catalog.visible();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].id, ProductId::new(2));
}

#[tokio::test]
async fn test_category_filter_and_reset() {
    let api = stocked_api().await;
    let mut catalog = CatalogView::load(&api.storefront()).await.unwrap();

    catalog.set_criteria(FilterCriteria::from_inputs("A", "", "", "").unwrap());
    let visible = catalog.visible();
    assert_eq!(visible.len(), 2);
    assert!(
        visible
            .iter()
            .all(|p| p.category.as_deref() == Some("A"))
    );

    catalog.reset_filters();
    assert_eq!(catalog.visible(), catalog.products());
}

#[tokio::test]
async fn test_combined_filters_are_inclusive() {
    let api = stocked_api().await;
    let mut catalog = CatalogView::load(&api.storefront()).await.unwrap();

    catalog.set_criteria(FilterCriteria::from_inputs("", "15", "35.50", "4.6").unwrap());

    let names: Vec<String> = catalog.visible().into_iter().map(|p| p.name).collect();
    assert_eq!(names, ["Kettle", "Gift card"]);
}

#[tokio::test]
async fn test_pages_cover_the_visible_list() {
    let api = stocked_api().await;
    let catalog = CatalogView::load(&api.storefront()).await.unwrap();

    let first = catalog.page(1, 3);
    let second = catalog.page(2, 3);

    assert_eq!(first.items.len(), 3);
    assert_eq!(second.items.len(), 1);
    assert_eq!(first.total_pages, 2);
    assert!(first.has_more());
    assert!(!second.has_more());
}

// ============================================================================
// Add to cart
// ============================================================================

#[tokio::test]
async fn test_add_to_cart_requires_login() {
    let api = stocked_api().await;
    let catalog = CatalogView::load(&api.storefront()).await.unwrap();

    let err = catalog.add_to_cart(ProductId::new(1)).await.unwrap_err();

    assert!(matches!(err, StorefrontError::LoginRequired));
    assert!(api.requests_to("POST", "/cart/add/").is_empty());
}

#[tokio::test]
async fn test_add_to_cart_posts_one_unit_and_invalidates_cart() {
    let api = stocked_api().await;
    let storefront = api.signed_in("alice", false).await;

    // Prime the cached cart.
    let before = CartView::load(&storefront).await.unwrap();
    assert_eq!(before.line_count(), 0);

    let catalog = CatalogView::load(&storefront).await.unwrap();
    catalog.add_to_cart(ProductId::new(2)).await.unwrap();

    let posted = api.requests_to("POST", "/cart/add/");
    assert_eq!(posted.len(), 1);
    assert_eq!(
        posted[0].body.as_ref().unwrap(),
        &serde_json::json!({"product_id": 2, "quantity": 1})
    );

    let after = CartView::load(&storefront).await.unwrap();
    assert_eq!(after.line_count(), 1);
    assert_eq!(after.total(), Price::from_units(20));
}
