//! Product snapshot as served by the catalog.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product snapshot.
///
/// Favorites and cart lines embed a copy of the product as it looked when it
/// was added, so they render without another catalog lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Price,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
}

impl Product {
    /// Create a product snapshot with only the required fields set.
    #[must_use]
    pub fn new(
        id: ProductId,
        title: impl Into<String>,
        price: Price,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            price,
            image_url: image_url.into(),
            description: None,
            ingredients: None,
            calories: None,
            story: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_backend_payload() {
        let json = r#"{
            "id": 3,
            "title": "Oatmeal Raisin",
            "price": 120.00,
            "imageUrl": "/cookies/oatmeal.png",
            "description": "Chewy",
            "calories": "410 kcal",
            "rating": 5
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.title, "Oatmeal Raisin");
        assert_eq!(product.price, Price::from_units(120));
        assert_eq!(product.description.as_deref(), Some("Chewy"));
        assert_eq!(product.calories.as_deref(), Some("410 kcal"));
        assert!(product.story.is_none());
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let product = Product::new(ProductId::new(1), "Plain", Price::from_units(1), "/p.png");
        let json = serde_json::to_value(&product).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["imageUrl"], "/p.png");
    }
}
