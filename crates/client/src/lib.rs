//! Cookie Shop client library.
//!
//! Talks to the Cookie Shop REST backend and keeps a favorites list that
//! works for both guests and signed-in users.
//!
//! # Modules
//!
//! - [`favorites`] - the favorites reconciler (guest storage vs server)
//! - [`api`] - REST client for accounts, favorites, orders, products and
//!   suggestions
//! - [`auth`] - login and registration requests and responses
//! - [`storage`] - durable key/value storage mirroring `localStorage`
//! - [`session`] - guest/authenticated session derived from storage
//! - [`cart`] - local cart with totals and VAT
//! - [`orders`] - orders built from the cart
//! - [`suggestions`] - product suggestions
//! - [`context`] - [`ShopContext`], the shared handle for front ends
//!
//! # Example
//!
//! ```rust,ignore
//! use cookie_shop_client::{ClientConfig, ShopContext};
//!
//! let context = ShopContext::new(ClientConfig::from_env()?)?;
//! let favorites = context.favorites().await.fetch(false).await.to_vec();
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod auth;
pub mod cart;
pub mod config;
pub mod context;
pub mod error;
pub mod favorites;
pub mod orders;
pub mod session;
pub mod storage;
pub mod suggestions;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError};
pub use context::ShopContext;
pub use error::{ClientError, Result};
pub use favorites::{
    FavoritesBackend, FavoritesError, FavoritesReconciler, ProductCard, SyncReport, ToggleOutcome,
};
