use common::{OrderId, ProductId, ShipmentId, UserId};
use thiserror::Error;

/// Errors that can occur when interacting with the document stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An order with the same id already exists. Surfaced to the order-id
    /// generation retry loop.
    #[error("Order id already taken: {0}")]
    DuplicateOrderId(OrderId),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Cart not found for user: {0}")]
    CartNotFound(UserId),

    #[error("Shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// The order already has a shipment on file.
    #[error("Shipment already exists for order: {0}")]
    DuplicateShipment(OrderId),

    /// An account with the same email already exists.
    #[error("Account already exists for email: {0}")]
    DuplicateAccount(String),

    #[error("Account not found for email: {0}")]
    AccountNotFound(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
