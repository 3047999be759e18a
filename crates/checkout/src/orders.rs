//! Order placement.

use chrono::Utc;
use common::{OrderId, ProductId};
use domain::{
    Customer, Order, OrderError, OrderLine, PaymentMethod, PricingBreakdown, ShippingAddress,
};
use store::{Backend, StoreError};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::services::notifier::{Notification, Notifier, send_best_effort};
use crate::stock;

/// A direct-buy line, priced at checkout from the catalog.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub selected_color: Option<String>,
}

/// Where the order's lines come from.
#[derive(Debug, Clone)]
pub enum OrderSource {
    /// The customer's saved cart, cleared once the order is durable.
    Cart,
    /// An explicit item list.
    Items(Vec<NewOrderItem>),
}

/// Command to place an order.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub customer: Customer,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub source: OrderSource,
}

/// Places orders against the catalog and cart stores.
///
/// Cash-on-delivery orders deduct stock immediately; prepaid orders
/// deduct only once the payment is verified.
#[derive(Clone)]
pub struct OrderService<B, N> {
    store: B,
    notifier: N,
    config: CheckoutConfig,
}

impl<B, N> OrderService<B, N>
where
    B: Backend,
    N: Notifier,
{
    pub fn new(store: B, notifier: N, config: CheckoutConfig) -> Self {
        Self {
            store,
            notifier,
            config,
        }
    }

    /// Places an order and returns it with its id and serial assigned.
    #[tracing::instrument(skip(self, cmd), fields(user_id = %cmd.customer.user_id()))]
    pub async fn place_order(&self, cmd: PlaceOrder) -> Result<Order> {
        metrics::counter!("orders_placed_total").increment(1);

        let (lines, from_cart) = self.resolve_lines(&cmd).await?;
        let total = lines.iter().map(|l| l.line_total()).sum();
        let pricing = PricingBreakdown::compute(total, &self.config.pricing);

        let now = Utc::now();
        let order = Order::new(
            OrderId::generate(now),
            cmd.customer.clone(),
            lines,
            cmd.shipping_address,
            cmd.payment_method,
            pricing,
            now,
        )?;

        // COD takes its stock up front; a shortfall fails placement.
        if !order.payment_method.is_prepaid() {
            stock::deduct_lines_strict(&self.store, &order.lines).await?;
        }

        let rollback_lines = order.lines.clone();
        let order = match self.insert_with_retry(order).await {
            Ok(order) => order,
            Err(error) => {
                if !cmd.payment_method.is_prepaid() {
                    stock::restore_lines(&self.store, &rollback_lines).await.ok();
                }
                return Err(error);
            }
        };

        if from_cart {
            self.store.delete_cart(cmd.customer.user_id()).await?;
        }

        if let Some(email) = order.contact_email() {
            send_best_effort(
                &self.notifier,
                Notification::OrderConfirmation {
                    order_id: order.order_id.clone(),
                    email: email.to_string(),
                },
            )
            .await;
        }

        tracing::info!(order_id = %order.order_id, serial = order.serial, "order placed");
        Ok(order)
    }

    async fn resolve_lines(&self, cmd: &PlaceOrder) -> Result<(Vec<OrderLine>, bool)> {
        let requested: Vec<NewOrderItem> = match &cmd.source {
            OrderSource::Items(items) => items.clone(),
            OrderSource::Cart => {
                let user_id = cmd.customer.user_id();
                let cart = self
                    .store
                    .get_cart(user_id)
                    .await?
                    .filter(|c| !c.is_empty())
                    .ok_or(CheckoutError::EmptyCart(user_id))?;
                cart.items
                    .iter()
                    .map(|item| NewOrderItem {
                        product_id: item.product_id.clone(),
                        quantity: item.quantity,
                        selected_color: item.selected_color.clone(),
                    })
                    .collect()
            }
        };

        if requested.is_empty() {
            return Err(CheckoutError::Order(OrderError::EmptyOrder));
        }

        let mut lines = Vec::with_capacity(requested.len());
        for item in requested {
            let product = self
                .store
                .get_product(&item.product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(item.product_id.clone()))?;

            let color = item.selected_color.as_deref();
            let available = product.available_stock(color);
            if available < item.quantity {
                return Err(CheckoutError::Order(OrderError::InsufficientStock {
                    product: item.product_id,
                    requested: item.quantity,
                    available,
                }));
            }

            lines.push(OrderLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                quantity: item.quantity,
                unit_price: product.price,
                selected_color: item.selected_color,
            });
        }
        Ok((lines, matches!(cmd.source, OrderSource::Cart)))
    }

    /// Inserts the order, regenerating the id on a collision. After the
    /// retry budget is spent, a timestamp-suffixed fallback id is used.
    async fn insert_with_retry(&self, mut order: Order) -> Result<Order> {
        for attempt in 0..OrderId::MAX_GENERATION_ATTEMPTS {
            if self.store.order_id_exists(&order.order_id).await? {
                tracing::debug!(order_id = %order.order_id, attempt, "order id taken, regenerating");
                order.order_id = OrderId::generate(Utc::now());
                continue;
            }
            match self.store.insert_order(order.clone()).await {
                Ok(inserted) => return Ok(inserted),
                // Raced with a concurrent insert of the same id.
                Err(StoreError::DuplicateOrderId(taken)) => {
                    tracing::debug!(order_id = %taken, attempt, "order id collision, retrying");
                    order.order_id = OrderId::generate(Utc::now());
                }
                Err(error) => return Err(error.into()),
            }
        }
        order.order_id = OrderId::fallback(Utc::now());
        Ok(self.store.insert_order(order).await?)
    }
}
