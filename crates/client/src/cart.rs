//! Local shopping cart.
//!
//! The cart never touches the server. It is stored under the `cart` key and
//! written back after every mutation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use cookie_shop_core::{Price, Product, ProductId};

use crate::storage::{self, KeyValueStore, StorageError, keys};

/// VAT rate applied on top of the cart total, in percent.
pub const VAT_PERCENT: u32 = 5;

const fn default_quantity() -> u32 {
    1
}

/// A cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl CartItem {
    /// Price of the line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

impl From<Product> for CartItem {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            title: product.title,
            price: product.price,
            image_url: product.image_url,
            quantity: 1,
        }
    }
}

/// Cart backed by client storage.
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
    items: Vec<CartItem>,
}

impl CartStore {
    /// Load the cart from storage. A missing or corrupt value is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Result<Self, StorageError> {
        let items = storage::load_json(store.as_ref(), keys::CART)?.unwrap_or_default();
        Ok(Self { store, items })
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    /// Add a product with quantity 1. Does nothing if it is already present.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&mut self, product: Product) -> Result<(), StorageError> {
        if self.contains(product.id) {
            debug!("Product already in cart");
            return Ok(());
        }
        self.items.push(CartItem::from(product));
        self.save()
    }

    /// Add a product, or bump its quantity when it is already present.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add_or_increment(&mut self, product: Product) -> Result<(), StorageError> {
        if let Some(item) = self.item_mut(product.id) {
            item.quantity = item.quantity.saturating_add(1);
        } else {
            self.items.push(CartItem::from(product));
        }
        self.save()
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub fn remove(&mut self, id: ProductId) -> Result<(), StorageError> {
        self.items.retain(|item| item.id != id);
        self.save()
    }

    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub fn increase(&mut self, id: ProductId) -> Result<(), StorageError> {
        if let Some(item) = self.item_mut(id) {
            item.quantity = item.quantity.saturating_add(1);
        }
        self.save()
    }

    /// Lower the quantity by one. Quantities never drop below 1.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub fn decrease(&mut self, id: ProductId) -> Result<(), StorageError> {
        if let Some(item) = self.item_mut(id).filter(|item| item.quantity > 1) {
            item.quantity -= 1;
        }
        self.save()
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.items.clear();
        self.save()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of every line total.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// VAT on the total, rounded to a whole unit.
    #[must_use]
    pub fn vat_price(&self) -> Price {
        self.total_price().percent_rounded(VAT_PERCENT)
    }

    fn item_mut(&mut self, id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    fn save(&self) -> Result<(), StorageError> {
        storage::save_json(self.store.as_ref(), keys::CART, &self.items)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: i64, units: i64) -> Product {
        Product::new(ProductId::new(id), format!("Cookie {id}"), Price::from_units(units), "")
    }

    fn empty_cart() -> (Arc<MemoryStore>, CartStore) {
        let store = Arc::new(MemoryStore::new());
        let cart = CartStore::load(store.clone()).unwrap();
        (store, cart)
    }

    #[test]
    fn test_add_is_idempotent() {
        let (_store, mut cart) = empty_cart();
        cart.add(product(1, 100)).unwrap();
        cart.add(product(1, 100)).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_add_or_increment() {
        let (_store, mut cart) = empty_cart();
        cart.add_or_increment(product(1, 100)).unwrap();
        cart.add_or_increment(product(1, 100)).unwrap();

        assert_eq!(cart.items()[0].quantity, 2);
    }

    #[test]
    fn test_decrease_stops_at_one() {
        let (_store, mut cart) = empty_cart();
        cart.add(product(1, 100)).unwrap();
        cart.increase(ProductId::new(1)).unwrap();
        cart.decrease(ProductId::new(1)).unwrap();
        cart.decrease(ProductId::new(1)).unwrap();

        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_totals_and_vat() {
        let (_store, mut cart) = empty_cart();
        cart.add(product(1, 150)).unwrap();
        cart.add(product(2, 60)).unwrap();
        cart.increase(ProductId::new(2)).unwrap();

        // 150 + 2 * 60 = 270, 5% = 13.5 rounds away from zero.
        assert_eq!(cart.total_price(), Price::from_units(270));
        assert_eq!(cart.vat_price(), Price::from_units(14));
    }

    #[test]
    fn test_mutations_persist() {
        let (store, mut cart) = empty_cart();
        cart.add(product(1, 100)).unwrap();
        cart.add(product(2, 100)).unwrap();
        cart.remove(ProductId::new(1)).unwrap();

        let reloaded = CartStore::load(store).unwrap();
        assert_eq!(reloaded.items(), cart.items());
        assert!(!reloaded.contains(ProductId::new(1)));
        assert!(reloaded.contains(ProductId::new(2)));
    }

    #[test]
    fn test_clear_persists_empty_cart() {
        let (store, mut cart) = empty_cart();
        cart.add(product(1, 100)).unwrap();
        cart.clear().unwrap();

        assert!(cart.is_empty());
        assert!(CartStore::load(store).unwrap().is_empty());
    }

    #[test]
    fn test_missing_quantity_defaults_to_one() {
        let store = Arc::new(MemoryStore::new());
        store
            .set_item(
                keys::CART,
                r#"[{"id": 3, "title": "Oat", "price": 50, "imageUrl": "/o.png"}]"#,
            )
            .unwrap();

        let cart = CartStore::load(store).unwrap();
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.total_price(), Price::from_units(50));
    }
}
