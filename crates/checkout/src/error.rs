//! Checkout error types.

use common::{OrderId, ProductId, UserId};
use domain::OrderError;
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during checkout flows.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Product not found in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The user has no cart, or the cart holds no items.
    #[error("Cart is empty for user {0}")]
    EmptyCart(UserId),

    /// The payment signature did not match. The order is left untouched.
    #[error("Payment signature verification failed for order {0}")]
    InvalidSignature(OrderId),

    /// A gateway order was requested for an order that is already paid.
    #[error("Order {0} is already paid")]
    AlreadyPaid(OrderId),

    /// A refund was requested but no payment is on file.
    #[error("Order {0} has no captured payment to refund")]
    NoPaymentOnFile(OrderId),

    /// The order already has a shipment booked.
    #[error("Order {0} already has a shipment")]
    ShipmentExists(OrderId),

    /// No shipment is on file for the order.
    #[error("Order {0} has no shipment")]
    NoShipment(OrderId),

    /// The caller does not own the order.
    #[error("Not authorized to act on order {0}")]
    NotAuthorized(OrderId),

    /// Payment gateway error.
    #[error("Payment gateway error: {0}")]
    Gateway(String),

    /// Shipping carrier error.
    #[error("Carrier error: {0}")]
    Carrier(String),

    /// Notification dispatch error.
    #[error("Notification error: {0}")]
    Notification(String),

    /// Domain rule violation.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
