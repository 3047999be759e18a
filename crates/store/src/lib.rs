//! Persistence layer for the storefront backend.
//!
//! Exposes one trait per document collection (orders, products, carts,
//! shipments, accounts) plus the [`Backend`] supertrait the checkout
//! layer runs against, with a PostgreSQL implementation for production
//! and an in-memory implementation for tests.

mod account;
mod error;
mod memory;
mod postgres;
pub mod repository;

pub use account::Account;
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use repository::{AccountStore, Backend, CartStore, OrderStore, ProductStore, ShipmentStore};
