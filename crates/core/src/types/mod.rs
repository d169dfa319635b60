//! Core types for Cookie Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod favorite;
pub mod id;
pub mod price;
pub mod product;

pub use favorite::{FavoriteItem, FavoriteKey, LocalFavoriteItem};
pub use id::*;
pub use price::Price;
pub use product::Product;
