//! Session state derived from client storage.
//!
//! A session is authenticated when both an auth token and a user id are
//! stored. Nothing else about the user is modeled here.

use secrecy::{ExposeSecret, SecretString};

use cookie_shop_core::UserId;

use crate::storage::{KeyValueStore, StorageError, keys};

/// Credentials of a signed-in user.
///
/// The token is kept secret and redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Backend user id, sent as `X-User-Id`.
    pub user_id: UserId,
    token: SecretString,
}

impl Credentials {
    /// Create credentials from a user id and bearer token.
    #[must_use]
    pub fn new(user_id: UserId, token: impl Into<String>) -> Self {
        Self {
            user_id,
            token: SecretString::from(token.into()),
        }
    }

    /// The bearer token.
    #[must_use]
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }
}

/// Current session mode.
#[derive(Debug, Clone)]
pub enum Session {
    /// No usable credentials are stored.
    Guest,
    /// A token and user id are stored.
    Authenticated(Credentials),
}

impl Session {
    /// Derive the session from storage.
    ///
    /// Empty values and an unparsable user id count as a guest session.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let token = store
            .get_item(keys::AUTH_TOKEN)?
            .filter(|token| !token.trim().is_empty());
        let user_id = store
            .get_item(keys::USER_ID)?
            .filter(|id| !id.trim().is_empty());

        let (Some(token), Some(user_id)) = (token, user_id) else {
            return Ok(Self::Guest);
        };

        match user_id.parse::<UserId>() {
            Ok(user_id) => Ok(Self::Authenticated(Credentials::new(user_id, token))),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "Stored user id is not numeric");
                Ok(Self::Guest)
            }
        }
    }

    /// Whether the session is authenticated.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    /// The credentials, if authenticated.
    #[must_use]
    pub const fn credentials(&self) -> Option<&Credentials> {
        match self {
            Self::Authenticated(credentials) => Some(credentials),
            Self::Guest => None,
        }
    }
}

/// Whether storage currently holds an authenticated session.
///
/// Unreadable storage counts as a guest session.
#[must_use]
pub fn is_authenticated(store: &dyn KeyValueStore) -> bool {
    match Session::load(store) {
        Ok(session) => session.is_authenticated(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read session, treating as guest");
            false
        }
    }
}

/// Persist credentials, making the session authenticated.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub fn sign_in(store: &dyn KeyValueStore, credentials: &Credentials) -> Result<(), StorageError> {
    store.set_item(keys::AUTH_TOKEN, credentials.token())?;
    store.set_item(keys::USER_ID, &credentials.user_id.to_string())
}

/// Remove stored credentials, making the session a guest session.
///
/// # Errors
///
/// Returns an error if storage cannot be written.
pub fn sign_out(store: &dyn KeyValueStore) -> Result<(), StorageError> {
    store.remove_item(keys::AUTH_TOKEN)?;
    store.remove_item(keys::USER_ID)
}
