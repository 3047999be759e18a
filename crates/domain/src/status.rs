//! Order, payment, and payment-method state machines.

use serde::{Deserialize, Serialize};

/// The lifecycle status of an order.
///
/// Nominal flow:
/// ```text
/// pending ──► confirmed ──► processing ──► shipped ──► delivered
///    │            │             │             │
///    └────────────┴─────────────┴─────────────┴──► cancelled
/// ```
/// A cancelled order may be moved back to any operational status
/// (reactivation); `refunded`/`partially_refunded` are set by the refund
/// path only, never by a direct status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
    PartiallyRefunded,
}

impl OrderStatus {
    /// Returns true if a direct transition to `target` is permitted.
    ///
    /// Equal source and target is a no-op, handled separately by the
    /// caller.
    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(target, Confirmed | Cancelled),
            Confirmed => matches!(target, Processing | Cancelled),
            Processing => matches!(target, Shipped | Cancelled),
            Shipped => matches!(target, Delivered | Cancelled),
            Delivered => false,
            // Reactivation path: a cancelled order may re-enter the
            // operational flow.
            Cancelled => matches!(target, Pending | Confirmed | Processing | Shipped | Delivered),
            Refunded | PartiallyRefunded => false,
        }
    }

    /// Returns true if a user/admin cancellation is still permitted.
    pub fn is_cancellable(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
            OrderStatus::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment state of an order, updated by the reconciliation and refund
/// paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::PartiallyRefunded => "partially_refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the customer pays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Razorpay,
    Stripe,
    #[default]
    Cod,
}

impl PaymentMethod {
    /// Prepaid methods require gateway verification before stock is
    /// touched; cash-on-delivery deducts stock at order creation.
    pub fn is_prepaid(&self) -> bool {
        !matches!(self, PaymentMethod::Cod)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Razorpay => "razorpay",
            PaymentMethod::Stripe => "stripe",
            PaymentMethod::Cod => "cod",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
