//! Cookie Shop REST API client.
//!
//! # Architecture
//!
//! - One shared `reqwest::Client` with the configured request timeout
//! - Every request reads the session from client storage and attaches
//!   `Authorization: Bearer <token>` and `X-User-Id` when signed in
//! - Product lookups are cached in memory via `moka` (5 minute TTL)
//!
//! # Endpoints
//!
//! - `auth` - `POST /auth/login`, `POST /auth/register`
//! - `favorites` - `GET/POST/DELETE /favorites`, `DELETE /favorites/{id}`
//! - `orders` - `POST /orders`, `GET /orders/user`
//! - `products` - `GET /products`, `GET /products/{id}`
//! - `suggestions` - `POST /suggestions`, `GET /suggestions/user`

mod auth;
mod favorites;
mod orders;
mod products;
mod suggestions;

pub use favorites::FavoriteRecord;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use cookie_shop_core::{Product, ProductId};

use crate::config::ClientConfig;
use crate::session::Session;
use crate::storage::KeyValueStore;

/// Longest slice of a response body kept in errors and logs.
const MAX_BODY_IN_ERROR: usize = 200;

/// Errors that can occur when calling the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend rejected the credentials (401 or 403).
    #[error("unauthorized: HTTP {0}")]
    Unauthorized(u16),

    /// Backend returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the backend asked the user to sign in.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

/// Client for the Cookie Shop REST API.
///
/// Cheap to clone; clones share the connection pool and product cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    config: ClientConfig,
    store: Arc<dyn KeyValueStore>,
    products: Cache<ProductId, Product>,
}

impl ApiClient {
    /// Create a new API client reading session credentials from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &ClientConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        let products = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                config: config.clone(),
                store,
                products,
            }),
        })
    }

    /// Storage this client reads credentials from.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.inner.store
    }

    /// Start a request with session headers attached.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.inner.config.endpoint(path);
        let builder = self.inner.client.request(method, url);

        match Session::load(self.inner.store.as_ref()) {
            Ok(Session::Authenticated(credentials)) => builder
                .bearer_auth(credentials.token())
                .header("X-User-Id", credentials.user_id.to_string()),
            Ok(Session::Guest) => builder,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session, sending request anonymously");
                builder
            }
        }
    }
}

/// Send a request and return the body of a successful response.
async fn send_text(builder: RequestBuilder) -> Result<String, ApiError> {
    let response = builder.send().await?;
    let status = response.status();

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized(status.as_u16()));
    }

    let body = response.text().await?;

    if !status.is_success() {
        let message = truncate(&body);
        tracing::error!(status = %status, body = %message, "Backend returned non-success status");
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    Ok(body)
}

/// Send a request and decode a JSON response.
async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
    let body = send_text(builder).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(error = %e, body = %truncate(&body), "Failed to parse backend response");
        ApiError::Parse(e.to_string())
    })
}

/// Send a request whose response body is ignored.
async fn send_empty(builder: RequestBuilder) -> Result<(), ApiError> {
    send_text(builder).await.map(drop)
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_BODY_IN_ERROR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 500 - boom");

        let err = ApiError::Unauthorized(401);
        assert_eq!(err.to_string(), "unauthorized: HTTP 401");
        assert!(err.is_unauthorized());
    }

    #[test]
    fn test_truncate_limits_length() {
        let body = "x".repeat(500);
        assert_eq!(truncate(&body).len(), MAX_BODY_IN_ERROR);
        assert_eq!(truncate("short"), "short");
    }
}
