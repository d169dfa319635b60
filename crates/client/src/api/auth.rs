//! Account endpoints.

use reqwest::{Method, RequestBuilder};
use tracing::instrument;

use super::{ApiClient, ApiError, send_json};
use crate::auth::{AuthResponse, LoginRequest, RegisterRequest};

impl ApiClient {
    /// `POST /auth/login`.
    ///
    /// A 400 carrying the backend's `{success: false, message}` body is
    /// returned as a response so callers can show the message.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        auth_response(self.request(Method::POST, "auth/login").json(request)).await
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        auth_response(self.request(Method::POST, "auth/register").json(request)).await
    }
}

async fn auth_response(builder: RequestBuilder) -> Result<AuthResponse, ApiError> {
    match send_json(builder).await {
        Err(ApiError::Status { status: 400, message }) => Ok(serde_json::from_str(&message)
            .unwrap_or_else(|_| AuthResponse {
                message: Some(message),
                ..AuthResponse::default()
            })),
        other => other,
    }
}
