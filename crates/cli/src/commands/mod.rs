//! Subcommand implementations.
//!
//! Each command prints its result to stdout; logs go to stderr.

pub mod cart;
pub mod favorites;
pub mod orders;
pub mod products;
pub mod session;
pub mod suggest;
