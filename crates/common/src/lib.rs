//! Shared types used across the storefront backend.
//!
//! This crate provides the identifier newtypes and the `Money` value type
//! that every other crate builds on. Keeping them here avoids mixing up
//! the various string/UUID-based identifiers at compile time.

mod money;
mod types;

pub use money::Money;
pub use types::{OrderId, ProductId, ShipmentId, UserId};
