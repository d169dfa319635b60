//! Server side of the favorites reconciler.

use std::future::Future;

use cookie_shop_core::{FavoriteId, ProductId};

use crate::api::{ApiError, FavoriteRecord};

/// Server-backed favorites store.
///
/// [`ApiClient`](crate::api::ApiClient) is the production implementation;
/// tests substitute in-process fakes.
pub trait FavoritesBackend {
    /// Fetch every favorite of the signed-in user.
    fn list_favorites(&self) -> impl Future<Output = Result<Vec<FavoriteRecord>, ApiError>> + Send;

    /// Favorite a product, returning the stored favorite.
    fn add_favorite(
        &self,
        product_id: ProductId,
    ) -> impl Future<Output = Result<FavoriteRecord, ApiError>> + Send;

    /// Delete one favorite.
    fn remove_favorite(&self, id: FavoriteId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete every favorite of the signed-in user.
    fn clear_favorites(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}
