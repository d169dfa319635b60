//! Product catalog endpoints.

use reqwest::Method;
use tracing::{debug, instrument};

use cookie_shop_core::{Product, ProductId};

use super::{ApiClient, ApiError, send_json};

impl ApiClient {
    /// List products, optionally filtered by a search query.
    ///
    /// Every listed product refreshes the lookup cache.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, ApiError> {
        let mut builder = self.request(Method::GET, "products");
        if let Some(query) = search.filter(|q| !q.trim().is_empty()) {
            builder = builder.query(&[("search", query.trim())]);
        }

        let products: Vec<Product> = send_json(builder).await?;

        for product in &products {
            self.inner
                .products
                .insert(product.id, product.clone())
                .await;
        }

        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        if let Some(product) = self.inner.products.get(&id).await {
            debug!("Cache hit for product");
            return Ok(product);
        }

        let product: Product = send_json(self.request(Method::GET, &format!("products/{id}"))).await?;

        self.inner.products.insert(id, product.clone()).await;

        Ok(product)
    }
}
