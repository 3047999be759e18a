//! Notification dispatch trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId};
use domain::OrderStatus;

use crate::error::CheckoutError;

/// A customer-facing notification.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    OrderConfirmation {
        order_id: OrderId,
        email: String,
    },
    PaymentReceipt {
        order_id: OrderId,
        email: String,
        amount: Money,
    },
    StatusUpdate {
        order_id: OrderId,
        email: String,
        status: OrderStatus,
    },
    Cancellation {
        order_id: OrderId,
        email: String,
    },
    /// Back-office notice recording who cancelled and why.
    AdminCancellation {
        order_id: OrderId,
        cancelled_by: String,
        reason: Option<String>,
    },
    RefundIssued {
        order_id: OrderId,
        email: String,
        amount: Money,
    },
    ShipmentBooked {
        order_id: OrderId,
        email: String,
        awb_number: Option<String>,
    },
    GuestCredentials {
        email: String,
        temp_password: String,
    },
}

/// Trait for sending customer notifications.
///
/// Dispatch is best-effort at every call site: a failed send is logged
/// and never fails the surrounding flow.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, notification: Notification) -> Result<(), CheckoutError>;
}

/// Sends a notification, logging instead of propagating a failure.
pub(crate) async fn send_best_effort<N: Notifier>(notifier: &N, notification: Notification) {
    if let Err(error) = notifier.send(notification).await {
        tracing::warn!(%error, "notification dispatch failed");
    }
}

#[derive(Debug, Default)]
struct InMemoryNotifierState {
    sent: Vec<Notification>,
    fail_on_send: bool,
}

/// In-memory notifier for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotifier {
    state: Arc<RwLock<InMemoryNotifierState>>,
}

impl InMemoryNotifier {
    /// Creates a new in-memory notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail sends.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.state.write().unwrap().fail_on_send = fail;
    }

    /// Returns everything sent so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.state.read().unwrap().sent.clone()
    }

    /// Returns the number of notifications sent.
    pub fn sent_count(&self) -> usize {
        self.state.read().unwrap().sent.len()
    }
}

#[async_trait]
impl Notifier for InMemoryNotifier {
    async fn send(&self, notification: Notification) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_send {
            return Err(CheckoutError::Notification("mailer down".to_string()));
        }

        state.sent.push(notification);
        Ok(())
    }
}
