//! End-to-end favorites tests against the in-process fake backend.
//!
//! Every test drives the real `ApiClient` over HTTP, so headers, status
//! mapping and response decoding are exercised along with the reconciler.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use serde_json::json;

use cookie_shop_client::favorites::{FavoritesError, ProductCard, ToggleOutcome};
use cookie_shop_client::session::{self, Credentials};
use cookie_shop_client::storage::{KeyValueStore, MemoryStore, keys};
use cookie_shop_client::{ApiError, ClientConfig, ShopContext};
use cookie_shop_core::{FavoriteKey, Price, Product, ProductId, UserId};
use cookie_shop_integration_tests::{FakeShop, VALID_TOKEN};

const USER: UserId = UserId::new(7);

fn product(id: i64, title: &str, units: i64) -> Product {
    Product::new(
        ProductId::new(id),
        title,
        Price::from_units(units),
        format!("/img/{id}.png"),
    )
}

async fn shop_with_catalog() -> FakeShop {
    let shop = FakeShop::start().await;
    shop.add_product(product(1, "Oatmeal Raisin", 90));
    shop.add_product(product(2, "Double Chocolate", 120));
    shop.add_product(product(3, "Ginger Snap", 80));
    shop
}

fn context_for(shop: &FakeShop) -> (Arc<MemoryStore>, ShopContext) {
    let store = Arc::new(MemoryStore::new());
    let config = ClientConfig::for_api_url(&shop.api_url()).unwrap();
    let context = ShopContext::with_store(config, store.clone()).unwrap();
    (store, context)
}

async fn signed_in(shop: &FakeShop) -> (Arc<MemoryStore>, ShopContext) {
    let (store, context) = context_for(shop);
    context
        .sign_in(&Credentials::new(USER, VALID_TOKEN))
        .await
        .unwrap();
    (store, context)
}

// =============================================================================
// Guest to signed-in
// =============================================================================

#[tokio::test]
async fn test_sign_in_syncs_guest_favorites() {
    let shop = shop_with_catalog().await;
    shop.state().fail_adds.insert(ProductId::new(2));
    let (store, context) = context_for(&shop);

    {
        let mut favorites = context.favorites().await;
        for id in [1, 2, 3] {
            let product = context.api().get_product(ProductId::new(id)).await.unwrap();
            favorites.add_to_local(product).unwrap();
        }
        assert_eq!(favorites.favorites().len(), 3);
    }

    let report = context
        .sign_in(&Credentials::new(USER, VALID_TOKEN))
        .await
        .unwrap();

    assert_eq!((report.attempted, report.synced, report.failed), (3, 2, 1));
    assert!(store.get_item(keys::LOCAL_FAVORITES).unwrap().is_none());
    assert_eq!(
        shop.state().favorite_products(USER),
        vec![ProductId::new(1), ProductId::new(3)]
    );
    assert_eq!(shop.state().count("GET /favorites"), 1);

    let favorites = context.favorites().await;
    let products: Vec<ProductId> = favorites.favorites().iter().map(|f| f.product_id()).collect();
    assert_eq!(products, vec![ProductId::new(1), ProductId::new(3)]);
    assert!(
        favorites
            .favorites()
            .iter()
            .all(|f| matches!(f.key, FavoriteKey::Remote(_)))
    );
}

#[tokio::test]
async fn test_sign_out_returns_to_guest_list() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;

    let mut card = ProductCard::new(product(1, "Oatmeal Raisin", 90));
    context.favorites().await.toggle(&mut card).await.unwrap();

    context.sign_out().await.unwrap();

    assert!(context.favorites().await.favorites().is_empty());
    assert_eq!(shop.state().favorite_products(USER), vec![ProductId::new(1)]);
}

// =============================================================================
// Toggle
// =============================================================================

#[tokio::test]
async fn test_toggle_round_trip() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;
    let mut favorites = context.favorites().await;
    let mut card = ProductCard::new(product(2, "Double Chocolate", 120));

    let outcome = favorites.toggle(&mut card).await.unwrap();
    let ToggleOutcome::Added(id) = outcome else {
        panic!("expected Added, got {outcome:?}");
    };
    assert_eq!(card.favorite_id, Some(id));

    favorites.fetch(false).await;
    assert_eq!(favorites.favorites().len(), 1);
    assert_eq!(favorites.favorites()[0].key, FavoriteKey::Remote(id));

    assert_eq!(favorites.toggle(&mut card).await.unwrap(), ToggleOutcome::Removed);
    assert!(favorites.favorites().is_empty());
    assert!(shop.state().favorite_products(USER).is_empty());
}

#[tokio::test]
async fn test_toggle_with_rejected_token_rolls_back() {
    let shop = shop_with_catalog().await;
    let (store, context) = context_for(&shop);
    session::sign_in(store.as_ref(), &Credentials::new(USER, "expired")).unwrap();
    let mut card = ProductCard::new(product(1, "Oatmeal Raisin", 90));

    let err = context
        .favorites()
        .await
        .toggle(&mut card)
        .await
        .unwrap_err();

    assert!(matches!(err, FavoritesError::Api(ApiError::Unauthorized(401))));
    assert!(!card.is_favorite);
    assert!(card.favorite_id.is_none());
}

#[tokio::test]
async fn test_toggle_with_empty_add_response_rolls_back() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;
    shop.state().empty_add_response = true;
    let mut card = ProductCard::new(product(3, "Ginger Snap", 80));

    let err = context
        .favorites()
        .await
        .toggle(&mut card)
        .await
        .unwrap_err();

    // The server stored it but never said under which id.
    assert!(matches!(err, FavoritesError::MissingFavoriteId));
    assert!(!card.is_favorite);
    assert_eq!(shop.state().favorite_products(USER), vec![ProductId::new(3)]);
}

// =============================================================================
// Fetch
// =============================================================================

#[tokio::test]
async fn test_fetch_failure_keeps_cached_list() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;
    let mut favorites = context.favorites().await;
    let mut card = ProductCard::new(product(1, "Oatmeal Raisin", 90));
    favorites.toggle(&mut card).await.unwrap();
    let before = favorites.favorites().to_vec();

    shop.state().fail_list = true;

    assert_eq!(favorites.fetch(true).await, before.as_slice());
}

#[tokio::test]
async fn test_fetch_tolerates_malformed_bodies() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;
    let mut favorites = context.favorites().await;

    shop.state().favorites_body = Some(json!({"error": "not a list"}));
    assert!(favorites.fetch(true).await.is_empty());

    shop.state().favorites_body = Some(json!([
        {"id": 1, "userId": 7, "product": {"id": 1, "title": "Oatmeal Raisin", "price": 90, "imageUrl": ""}},
        {"id": 2, "userId": 7},
        {"id": "nonsense"},
    ]));
    let items = favorites.fetch(true).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id(), ProductId::new(1));
}

#[tokio::test]
async fn test_shorter_server_list_never_overwrites() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;
    let mut favorites = context.favorites().await;
    for id in [1, 2] {
        let mut card = ProductCard::new(context.api().get_product(ProductId::new(id)).await.unwrap());
        favorites.toggle(&mut card).await.unwrap();
    }

    // Another device removed one of them.
    shop.state().favorites.remove(0);

    assert_eq!(favorites.fetch(false).await.len(), 2);
    // Only an empty forced result may drop cached entries.
    assert_eq!(favorites.fetch(true).await.len(), 2);

    shop.state().favorites.clear();
    assert!(favorites.fetch(true).await.is_empty());
}

// =============================================================================
// Remove / Clear
// =============================================================================

#[tokio::test]
async fn test_remove_by_legacy_id() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;
    let mut favorites = context.favorites().await;
    let mut card = ProductCard::new(product(1, "Oatmeal Raisin", 90));
    let ToggleOutcome::Added(id) = favorites.toggle(&mut card).await.unwrap() else {
        panic!("expected Added");
    };

    let key = FavoriteKey::from_legacy_id(id.as_i64());
    favorites.remove(key).await.unwrap();

    assert!(favorites.favorites().is_empty());
    assert_eq!(shop.state().count("DELETE /favorites/{id}"), 1);
}

#[tokio::test]
async fn test_clear_all_failure_resynchronizes() {
    let shop = shop_with_catalog().await;
    let (_store, context) = signed_in(&shop).await;
    let mut favorites = context.favorites().await;
    let mut card = ProductCard::new(product(1, "Oatmeal Raisin", 90));
    favorites.toggle(&mut card).await.unwrap();

    {
        let mut state = shop.state();
        state.fail_clear = true;
        state.favorites.clear();
    }

    assert!(favorites.clear_all().await.is_err());
    // The refetch saw an empty server list but was not forced.
    assert_eq!(favorites.favorites().len(), 1);

    shop.state().fail_clear = false;
    favorites.clear_all().await.unwrap();
    assert!(favorites.favorites().is_empty());
}
