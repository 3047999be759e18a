//! Order status transitions and cancellation flows.

use chrono::Utc;
use common::{OrderId, UserId};
use domain::{Order, OrderStatus};
use store::Backend;

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::services::carrier::CarrierService;
use crate::services::notifier::{Notification, Notifier, send_best_effort};
use crate::shipping::ShippingService;
use crate::stock;

/// Who is asking for the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    /// A customer; may only touch their own orders.
    User(UserId),
    Admin,
}

impl Actor {
    fn label(&self) -> &'static str {
        match self {
            Actor::User(_) => "user",
            Actor::Admin => "admin",
        }
    }
}

/// Applies status transitions with their stock and shipment side
/// effects.
#[derive(Clone)]
pub struct StatusService<B, C, N> {
    store: B,
    shipping: ShippingService<B, C, N>,
    notifier: N,
}

impl<B, C, N> StatusService<B, C, N>
where
    B: Backend,
    C: CarrierService,
    N: Notifier + Clone,
{
    pub fn new(store: B, carrier: C, notifier: N, config: CheckoutConfig) -> Self {
        let shipping = ShippingService::new(store.clone(), carrier, notifier.clone(), config);
        Self {
            store,
            shipping,
            notifier,
        }
    }

    /// Admin status update following the transition graph.
    ///
    /// Moving into `cancelled` restores stock and soft-cancels any
    /// shipment; moving out of `cancelled` (reactivation) re-deducts,
    /// skipping lines the live stock can no longer cover.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(&self, order_id: &OrderId, target: OrderStatus) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;
        let change = order.transition(target, Utc::now())?;
        self.store.update_order(&order).await?;
        metrics::counter!("order_status_updates_total").increment(1);

        if change.to == OrderStatus::Cancelled {
            stock::restore_lines(&self.store, &order.lines).await?;
            self.shipping.cancel_for_order_soft(order_id, "admin").await;
        } else if change.from == OrderStatus::Cancelled {
            let skipped = stock::deduct_lines_lenient(&self.store, &order.lines).await?;
            if !skipped.is_empty() {
                tracing::warn!(
                    %order_id,
                    skipped = skipped.len(),
                    "reactivation re-deduction skipped lines without stock"
                );
            }
        }

        if let Some(email) = order.contact_email() {
            send_best_effort(
                &self.notifier,
                Notification::StatusUpdate {
                    order_id: order.order_id.clone(),
                    email: email.to_string(),
                    status: change.to,
                },
            )
            .await;
        }

        tracing::info!(%order_id, from = %change.from, to = %change.to, "order status updated");
        Ok(order)
    }

    /// Cancels an order on behalf of a user or an admin.
    ///
    /// Users may only cancel their own orders, and only while the order
    /// has not shipped. Stock is restored and any shipment is cancelled
    /// best-effort.
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel_order(
        &self,
        order_id: &OrderId,
        actor: Actor,
        reason: Option<String>,
    ) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;

        if let Actor::User(user_id) = actor
            && order.customer.user_id() != user_id
        {
            return Err(CheckoutError::NotAuthorized(order_id.clone()));
        }

        order.cancel(actor.label(), reason, Utc::now())?;
        self.store.update_order(&order).await?;
        metrics::counter!("orders_cancelled_total").increment(1);

        stock::restore_lines(&self.store, &order.lines).await?;
        self.shipping
            .cancel_for_order_soft(order_id, actor.label())
            .await;

        if let Some(email) = order.contact_email() {
            send_best_effort(
                &self.notifier,
                Notification::Cancellation {
                    order_id: order.order_id.clone(),
                    email: email.to_string(),
                },
            )
            .await;
        }
        send_best_effort(
            &self.notifier,
            Notification::AdminCancellation {
                order_id: order.order_id.clone(),
                cancelled_by: actor.label().to_string(),
                reason: order.cancellation_reason.clone(),
            },
        )
        .await;

        tracing::info!(%order_id, by = actor.label(), "order cancelled");
        Ok(order)
    }

    async fn load_order(&self, order_id: &OrderId) -> Result<Order> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
    }
}
