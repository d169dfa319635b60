//! Cookie Shop Core - Shared types library.
//!
//! This crate provides common types used across all Cookie Shop components:
//! - `client` - REST client, local storage, and the favorites reconciler
//! - `cli` - Command-line front end over the client
//! - `integration-tests` - Fake backend and end-to-end tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no storage
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, product snapshots, and favorites

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
