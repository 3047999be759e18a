use chrono::{DateTime, Utc};
use common::{Money, OrderId, ProductId, ShipmentId};
use serde::{Deserialize, Serialize};

use crate::address::ShippingAddress;
use crate::customer::Customer;
use crate::error::OrderError;
use crate::pricing::PricingBreakdown;
use crate::status::{OrderStatus, PaymentMethod, PaymentStatus};

/// A purchased line, frozen from the cart (or a direct buy) at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub selected_color: Option<String>,
}

impl OrderLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// A recorded refund against the order's payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub refund_id: String,
    pub amount: Money,
    pub gateway_payment_id: String,
    pub kind: RefundKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefundKind {
    Full,
    Partial,
}

/// Result of a successful status transition, used by callers to decide
/// on side effects (stock moves, notifications).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// The order aggregate. One document per order; every mutation goes
/// through a method that enforces the status rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    /// Monotonic per-store serial, assigned by the store at insert.
    pub serial: u64,
    pub customer: Customer,
    pub lines: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub order_status: OrderStatus,
    pub pricing: PricingBreakdown,
    /// Gateway-side order reference created before payment capture.
    pub gateway_order_id: Option<String>,
    /// Gateway-side payment reference recorded at verification.
    pub payment_id: Option<String>,
    pub shipment_id: Option<ShipmentId>,
    pub awb_number: Option<String>,
    pub courier_name: Option<String>,
    pub refunds: Vec<Refund>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Creates a new pending order. Pricing must already be computed from
    /// the same lines.
    pub fn new(
        order_id: OrderId,
        customer: Customer,
        lines: Vec<OrderLine>,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
        pricing: PricingBreakdown,
        created_at: DateTime<Utc>,
    ) -> Result<Self, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(line) = lines.iter().find(|l| l.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                quantity: line.quantity,
            });
        }
        Ok(Self {
            order_id,
            serial: 0,
            customer,
            lines,
            shipping_address,
            payment_method,
            payment_status: PaymentStatus::Pending,
            order_status: OrderStatus::Pending,
            pricing,
            gateway_order_id: None,
            payment_id: None,
            shipment_id: None,
            awb_number: None,
            courier_name: None,
            refunds: Vec::new(),
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            paid_at: None,
            delivered_at: None,
            created_at,
        })
    }

    /// True until the gateway confirms capture (always false once
    /// completed, including for COD after delivery).
    pub fn requires_payment(&self) -> bool {
        self.payment_method.is_prepaid() && self.payment_status != PaymentStatus::Completed
    }

    /// Records a verified payment and confirms the order.
    ///
    /// Returns true if the payment was already completed, in which case
    /// nothing is changed; verification is idempotent and a replayed
    /// webhook must not deduct stock twice.
    pub fn mark_paid(&mut self, payment_id: impl Into<String>, now: DateTime<Utc>) -> bool {
        if self.payment_status == PaymentStatus::Completed {
            return true;
        }
        self.payment_status = PaymentStatus::Completed;
        self.payment_id = Some(payment_id.into());
        self.paid_at = Some(now);
        if self.order_status == OrderStatus::Pending {
            self.order_status = OrderStatus::Confirmed;
        }
        false
    }

    /// Records a failed capture and cancels the order. Stock was never
    /// deducted for a prepaid order, so there is nothing to restore.
    pub fn mark_payment_failed(&mut self, now: DateTime<Utc>) {
        self.payment_status = PaymentStatus::Failed;
        self.order_status = OrderStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancellation_reason = Some("payment failed".to_string());
    }

    /// Applies a direct status update, enforcing the transition graph.
    ///
    /// Delivery stamps `delivered_at` and completes a COD payment on the
    /// spot.
    pub fn transition(
        &mut self,
        target: OrderStatus,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, OrderError> {
        let from = self.order_status;
        if from == target {
            return Err(OrderError::NoOpTransition { status: from });
        }
        if !from.can_transition_to(target) {
            return Err(OrderError::InvalidTransition { from, to: target });
        }
        self.order_status = target;
        if target == OrderStatus::Delivered {
            self.delivered_at = Some(now);
            if self.payment_method == PaymentMethod::Cod
                && self.payment_status == PaymentStatus::Pending
            {
                self.payment_status = PaymentStatus::Completed;
                self.paid_at = Some(now);
            }
        }
        if target == OrderStatus::Cancelled {
            self.cancelled_at = Some(now);
        }
        Ok(StatusChange { from, to: target })
    }

    /// Cancels the order on behalf of `actor`. Only orders that have not
    /// yet shipped qualify.
    pub fn cancel(
        &mut self,
        actor: impl Into<String>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<StatusChange, OrderError> {
        let from = self.order_status;
        if !from.is_cancellable() {
            return Err(OrderError::NotCancellable { status: from });
        }
        self.order_status = OrderStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancelled_by = Some(actor.into());
        self.cancellation_reason = reason;
        Ok(StatusChange {
            from,
            to: OrderStatus::Cancelled,
        })
    }

    /// Records a refund and updates the payment/order status pair.
    pub fn record_refund(&mut self, refund: Refund) {
        let kind = refund.kind;
        self.refunds.push(refund);
        match kind {
            RefundKind::Full => {
                self.payment_status = PaymentStatus::Refunded;
                self.order_status = OrderStatus::Refunded;
            }
            RefundKind::Partial => {
                self.payment_status = PaymentStatus::PartiallyRefunded;
                self.order_status = OrderStatus::PartiallyRefunded;
            }
        }
    }

    /// Links a booked shipment to the order.
    pub fn attach_shipment(
        &mut self,
        shipment_id: ShipmentId,
        awb_number: Option<String>,
        courier_name: Option<String>,
    ) {
        self.shipment_id = Some(shipment_id);
        self.awb_number = awb_number;
        self.courier_name = courier_name;
    }

    pub fn has_shipment(&self) -> bool {
        self.shipment_id.is_some()
    }

    /// Best email to reach the buyer: customer contact first, shipping
    /// address as a fallback.
    pub fn contact_email(&self) -> Option<&str> {
        let email = self.customer.contact_email();
        if !email.is_empty() {
            return Some(email);
        }
        self.shipping_address
            .email
            .as_deref()
            .filter(|e| !e.is_empty())
    }

    /// Total refunded so far.
    pub fn refunded_amount(&self) -> Money {
        self.refunds.iter().map(|r| r.amount).sum()
    }
}
