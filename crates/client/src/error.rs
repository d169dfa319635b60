//! Top-level error type for callers that drive several layers at once.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::favorites::FavoritesError;
use crate::storage::StorageError;

/// Any error the client library can return.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// A favorites operation failed.
    #[error("Favorites error: {0}")]
    Favorites(#[from] FavoritesError),

    /// The backend answered a login or registration without a user.
    #[error("Sign-in rejected: {0}")]
    SignInRejected(String),

    /// The operation needs a signed-in user.
    #[error("Sign in required")]
    SignInRequired,

    /// Checkout was attempted with nothing in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A caller-supplied value was out of range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result alias for [`ClientError`].
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
