//! Catalog, cart and suggestion flows against the fake backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use cookie_shop_client::session::{self, Credentials};
use cookie_shop_client::storage::MemoryStore;
use cookie_shop_client::suggestions::{self, Suggestion, SuggestionOutcome};
use cookie_shop_client::{ApiError, ClientConfig, ShopContext};
use cookie_shop_core::{Price, Product, ProductId, UserId};
use cookie_shop_integration_tests::{FakeShop, VALID_TOKEN};

fn product(id: i64, title: &str, units: i64) -> Product {
    Product::new(ProductId::new(id), title, Price::from_units(units), "")
}

async fn setup() -> (FakeShop, Arc<MemoryStore>, ShopContext) {
    let shop = FakeShop::start().await;
    shop.add_product(product(1, "Oatmeal Raisin", 90));
    shop.add_product(product(2, "Double Chocolate", 120));

    let store = Arc::new(MemoryStore::new());
    let config = ClientConfig::for_api_url(&shop.api_url()).unwrap();
    let context = ShopContext::with_store(config, store.clone()).unwrap();
    (shop, store, context)
}

fn suggestion() -> Suggestion {
    Suggestion {
        author: "Ann".to_string(),
        product_name: "Lemon crinkle".to_string(),
        description: "Powdered sugar and zest".to_string(),
    }
}

#[tokio::test]
async fn test_search_and_product_cache() {
    let (shop, _store, context) = setup().await;

    let found = context.api().list_products(Some("choc")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, ProductId::new(2));

    // Listed products are cached, so this lookup never reaches the server.
    let cached = context.api().get_product(ProductId::new(2)).await.unwrap();
    assert_eq!(cached.title, "Double Chocolate");
    assert_eq!(shop.state().count("GET /products/{id}"), 0);

    context.api().get_product(ProductId::new(1)).await.unwrap();
    context.api().get_product(ProductId::new(1)).await.unwrap();
    assert_eq!(shop.state().count("GET /products/{id}"), 1);
}

#[tokio::test]
async fn test_missing_product_is_status_error() {
    let (_shop, _store, context) = setup().await;

    let err = context.api().get_product(ProductId::new(99)).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 404, .. }));
}

#[tokio::test]
async fn test_cart_totals_from_catalog() {
    let (_shop, _store, context) = setup().await;
    let mut cart = context.cart().await;

    for id in [1, 2] {
        let product = context.api().get_product(ProductId::new(id)).await.unwrap();
        cart.add(product).unwrap();
    }
    cart.increase(ProductId::new(1)).unwrap();

    // 2 * 90 + 120 = 300, VAT 5% = 15
    assert_eq!(cart.total_price(), Price::from_units(300));
    assert_eq!(cart.vat_price(), Price::from_units(15));
}

#[tokio::test]
async fn test_suggestion_submitted_when_signed_in() {
    let (shop, _store, context) = setup().await;
    context
        .sign_in(&Credentials::new(UserId::new(5), VALID_TOKEN))
        .await
        .unwrap();

    let outcome = suggestions::submit(context.api(), &suggestion()).await.unwrap();
    assert!(matches!(outcome, SuggestionOutcome::Submitted(Some(_))));

    let mine = context.api().my_suggestions().await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].product_name, "Lemon crinkle");
    assert_eq!(mine[0].user_id, Some(UserId::new(5)));
    assert_eq!(shop.state().suggestions.len(), 1);
}

#[tokio::test]
async fn test_rejected_token_asks_for_sign_in() {
    let (shop, store, context) = setup().await;
    session::sign_in(store.as_ref(), &Credentials::new(UserId::new(5), "expired")).unwrap();

    let outcome = suggestions::submit(context.api(), &suggestion()).await.unwrap();

    assert_eq!(outcome, SuggestionOutcome::SignInRequired);
    assert!(shop.state().suggestions.is_empty());
}
