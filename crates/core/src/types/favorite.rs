//! Favorites data model.
//!
//! A favorite is identified either by the server-issued favorite id (signed-in
//! users) or by the product id of a guest's locally stored record. The two id
//! spaces are kept apart by [`FavoriteKey`] instead of folding one into the
//! other.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{FavoriteId, Product, ProductId};

/// Identity of a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteKey {
    /// A guest favorite stored locally, keyed by product.
    Local(ProductId),
    /// A favorite stored on the server.
    Remote(FavoriteId),
}

impl FavoriteKey {
    /// Encode as the legacy single-integer id.
    ///
    /// Remote ids are kept as-is and local ids become the negated product id.
    #[must_use]
    pub const fn to_legacy_id(self) -> i64 {
        match self {
            Self::Local(product_id) => product_id.as_i64().saturating_neg(),
            Self::Remote(id) => id.as_i64(),
        }
    }

    /// Decode a legacy single-integer id. Negative values are local.
    ///
    /// Product and favorite ids start at 1. `0` has no local encoding and
    /// decodes as `Remote(0)`; use [`Self::parse_legacy_id`] for user input.
    #[must_use]
    pub const fn from_legacy_id(id: i64) -> Self {
        if id < 0 {
            Self::Local(ProductId::new(id.saturating_neg()))
        } else {
            Self::Remote(FavoriteId::new(id))
        }
    }

    /// Decode a legacy id typed by a user, rejecting `0`.
    #[must_use]
    pub const fn parse_legacy_id(id: i64) -> Option<Self> {
        if id == 0 {
            None
        } else {
            Some(Self::from_legacy_id(id))
        }
    }

    /// The remote favorite id, if this is a server-backed favorite.
    #[must_use]
    pub const fn remote_id(self) -> Option<FavoriteId> {
        match self {
            Self::Remote(id) => Some(id),
            Self::Local(_) => None,
        }
    }
}

impl fmt::Display for FavoriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(product_id) => write!(f, "local:{product_id}"),
            Self::Remote(id) => write!(f, "remote:{id}"),
        }
    }
}

/// An entry in the favorites list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteItem {
    pub key: FavoriteKey,
    pub product: Product,
}

impl FavoriteItem {
    /// Create a server-backed favorite.
    #[must_use]
    pub const fn remote(id: FavoriteId, product: Product) -> Self {
        Self {
            key: FavoriteKey::Remote(id),
            product,
        }
    }

    /// The favorited product's id.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        self.product.id
    }

    /// Whether two entries describe the same favorite, by key or by product.
    #[must_use]
    pub fn represents(&self, other: &Self) -> bool {
        self.key == other.key || self.product_id() == other.product_id()
    }
}

/// A guest favorite as persisted in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalFavoriteItem {
    pub product_id: ProductId,
    pub product: Product,
}

impl From<Product> for LocalFavoriteItem {
    fn from(product: Product) -> Self {
        Self {
            product_id: product.id,
            product,
        }
    }
}

impl From<LocalFavoriteItem> for FavoriteItem {
    fn from(local: LocalFavoriteItem) -> Self {
        Self {
            key: FavoriteKey::Local(local.product_id),
            product: local.product,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Price;

    fn product(id: i64) -> Product {
        Product::new(ProductId::new(id), format!("Cookie {id}"), Price::from_units(id), "")
    }

    #[test]
    fn test_legacy_id_negates_local_keys() {
        assert_eq!(FavoriteKey::Local(ProductId::new(12)).to_legacy_id(), -12);
        assert_eq!(FavoriteKey::Remote(FavoriteId::new(12)).to_legacy_id(), 12);
    }

    #[test]
    fn test_legacy_id_decoding() {
        assert_eq!(
            FavoriteKey::from_legacy_id(-5),
            FavoriteKey::Local(ProductId::new(5))
        );
        assert_eq!(
            FavoriteKey::from_legacy_id(5),
            FavoriteKey::Remote(FavoriteId::new(5))
        );
    }

    #[test]
    fn test_legacy_id_zero_is_rejected() {
        // Product 0 would encode as 0 and come back as a remote key.
        let zero = FavoriteKey::Local(ProductId::new(0)).to_legacy_id();
        assert_eq!(FavoriteKey::from_legacy_id(zero), FavoriteKey::Remote(FavoriteId::new(0)));
        assert_eq!(FavoriteKey::parse_legacy_id(zero), None);

        assert_eq!(
            FavoriteKey::parse_legacy_id(-1),
            Some(FavoriteKey::Local(ProductId::new(1)))
        );
        assert_eq!(
            FavoriteKey::parse_legacy_id(1),
            Some(FavoriteKey::Remote(FavoriteId::new(1)))
        );
    }

    #[test]
    fn test_local_and_remote_keys_never_collide() {
        let local = FavoriteKey::Local(ProductId::new(3));
        let remote = FavoriteKey::Remote(FavoriteId::new(3));
        assert_ne!(local, remote);
    }

    #[test]
    fn test_represents_matches_by_product() {
        let remote = FavoriteItem::remote(FavoriteId::new(100), product(1));
        let local: FavoriteItem = LocalFavoriteItem::from(product(1)).into();
        let other = FavoriteItem::remote(FavoriteId::new(101), product(2));

        assert!(remote.represents(&local));
        assert!(!remote.represents(&other));
    }

    #[test]
    fn test_local_item_storage_format() {
        let item = LocalFavoriteItem::from(product(4));
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["productId"], 4);
        assert_eq!(json["product"]["id"], 4);
    }
}
