//! Account login and registration.
//!
//! The backend answers both calls with `{success, user, message}`. A
//! successful answer carries the user record; its id becomes the stored
//! `userId`. The backend issues no bearer token, so when the response has
//! none a fixed placeholder is stored to mark the session as signed in.

use core::fmt;

use serde::{Deserialize, Serialize};

use cookie_shop_core::UserId;

use crate::session::Credentials;

/// Token stored when the backend signs a user in without issuing one.
pub const UNISSUED_TOKEN: &str = "session";

/// Body of `POST /auth/login`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("full_name", &self.full_name)
            .finish()
    }
}

/// The user record inside an auth response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUser {
    pub id: UserId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Response to login and registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<AccountUser>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    /// Credentials to store, when the backend accepted the request.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        let user = self.user.as_ref().filter(|_| self.success)?;
        let token = self
            .token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
            .unwrap_or(UNISSUED_TOKEN);
        Some(Credentials::new(user.id, token))
    }

    /// The backend's message, or a generic one.
    #[must_use]
    pub fn reason(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "no user in response".to_string())
    }
}
