//! Durable client storage.
//!
//! Storage is a flat string key/value store, the same shape as a browser's
//! `localStorage`. Typed values are stored as JSON via [`load_json`] and
//! [`save_json`].
//!
//! # Implementations
//!
//! - [`FileStore`] - one file per key inside a data directory
//! - [`MemoryStore`] - process-local map, for tests and throwaway sessions

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Storage keys shared with the web client.
pub mod keys {
    /// Bearer token of the signed-in user.
    pub const AUTH_TOKEN: &str = "authToken";

    /// Id of the signed-in user.
    pub const USER_ID: &str = "userId";

    /// Guest favorites as a JSON array of `LocalFavoriteItem`.
    pub const LOCAL_FAVORITES: &str = "localFavorites";

    /// Cart lines as a JSON array of `CartItem`.
    pub const CART: &str = "cart";
}

/// Errors that can occur when reading or writing client storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,

    /// Key contains characters that are not allowed.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}

/// A string key/value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value.
///
/// A value that no longer decodes is treated as absent.
///
/// # Errors
///
/// Returns an error if the backing store cannot be read.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get_item(key)? else {
        return Ok(None);
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding undecodable stored value");
            Ok(None)
        }
    }
}

/// Encode and store a JSON value.
///
/// # Errors
///
/// Returns an error if encoding fails or the backing store cannot be written.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;
    store.set_item(key, &raw)
}
