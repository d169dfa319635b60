//! Favorites endpoints.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use cookie_shop_core::{FavoriteId, FavoriteItem, Product, ProductId, UserId};

use super::{ApiClient, ApiError, send_empty, send_json, send_text};
use crate::favorites::FavoritesBackend;

/// A favorite as returned by the backend.
///
/// Every field is optional so an incomplete response can be detected by the
/// caller instead of failing to decode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRecord {
    #[serde(default)]
    pub id: Option<FavoriteId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub product: Option<Product>,
}

impl FavoriteRecord {
    /// Convert to a list entry when both the id and the product are present.
    #[must_use]
    pub fn into_item(self) -> Option<FavoriteItem> {
        Some(FavoriteItem::remote(self.id?, self.product?))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddFavoriteRequest {
    product_id: ProductId,
}

impl FavoritesBackend for ApiClient {
    /// `GET /favorites`. A body that is not an array reads as an empty list.
    #[instrument(skip(self))]
    async fn list_favorites(&self) -> Result<Vec<FavoriteRecord>, ApiError> {
        let body: Value = send_json(self.request(Method::GET, "favorites")).await?;

        let Value::Array(entries) = body else {
            tracing::warn!("Favorites response is not an array, treating as empty");
            return Ok(Vec::new());
        };

        Ok(entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable favorite");
                    None
                }
            })
            .collect())
    }

    /// `POST /favorites {productId}`. An empty body reads as an empty record.
    #[instrument(skip(self), fields(product_id = %product_id))]
    async fn add_favorite(&self, product_id: ProductId) -> Result<FavoriteRecord, ApiError> {
        let builder = self
            .request(Method::POST, "favorites")
            .json(&AddFavoriteRequest { product_id });
        let body = send_text(builder).await?;

        if body.trim().is_empty() {
            return Ok(FavoriteRecord::default());
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// `DELETE /favorites/{id}`.
    #[instrument(skip(self), fields(favorite_id = %id))]
    async fn remove_favorite(&self, id: FavoriteId) -> Result<(), ApiError> {
        send_empty(self.request(Method::DELETE, &format!("favorites/{id}"))).await
    }

    /// `DELETE /favorites`.
    #[instrument(skip(self))]
    async fn clear_favorites(&self) -> Result<(), ApiError> {
        send_empty(self.request(Method::DELETE, "favorites")).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cookie_shop_core::FavoriteKey;

    #[test]
    fn test_record_from_backend_payload() {
        let json = r#"{
            "id": 11,
            "userId": 2,
            "product": {"id": 5, "title": "Snickerdoodle", "price": 90, "imageUrl": "/s.png"}
        }"#;

        let record: FavoriteRecord = serde_json::from_str(json).unwrap();
        let item = record.into_item().unwrap();
        assert_eq!(item.key, FavoriteKey::Remote(FavoriteId::new(11)));
        assert_eq!(item.product_id(), ProductId::new(5));
    }

    #[test]
    fn test_incomplete_records_do_not_convert() {
        let no_id: FavoriteRecord =
            serde_json::from_str(r#"{"product": {"id": 5, "title": "A", "price": 1, "imageUrl": ""}}"#)
                .unwrap();
        assert!(no_id.id.is_none());
        assert!(no_id.into_item().is_none());

        let no_product: FavoriteRecord = serde_json::from_str(r#"{"id": 3}"#).unwrap();
        assert!(no_product.into_item().is_none());
    }

    #[test]
    fn test_add_request_body() {
        let body = serde_json::to_value(AddFavoriteRequest {
            product_id: ProductId::new(8),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"productId": 8}));
    }
}
