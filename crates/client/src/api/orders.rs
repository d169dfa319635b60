//! Order endpoints.

use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, ApiError, send_json};
use crate::orders::{OrderRecord, OrderRequest};

impl ApiClient {
    /// `POST /orders`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, order), fields(lines = order.items.len()))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<OrderRecord, ApiError> {
        send_json(self.request(Method::POST, "orders").json(order)).await
    }

    /// `GET /orders/user`: orders placed by the signed-in user, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<OrderRecord>, ApiError> {
        send_json(self.request(Method::GET, "orders/user")).await
    }
}
