use common::ProductId;
use thiserror::Error;

use crate::status::OrderStatus;

/// Rule violations raised by the domain types.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: u32,
        available: u32,
    },

    #[error("order is already {status}")]
    NoOpTransition { status: OrderStatus },

    #[error("invalid status transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("order cannot be cancelled while {status}")]
    NotCancellable { status: OrderStatus },

    #[error("order must contain at least one line")]
    EmptyOrder,

    #[error("invalid quantity: {quantity}")]
    InvalidQuantity { quantity: u32 },

    #[error("shipping address is missing required fields: {}", fields.join(", "))]
    MissingShippingData { fields: Vec<String> },
}
