//! Payment gateway trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId};

use crate::error::CheckoutError;

/// A gateway-side order created ahead of payment capture.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    /// The order reference assigned by the gateway.
    pub gateway_order_id: String,
    pub amount: Money,
    pub currency: String,
}

/// A refund issued by the gateway.
#[derive(Debug, Clone)]
pub struct GatewayRefund {
    pub refund_id: String,
    pub amount: Money,
}

/// Trait for payment gateway operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a gateway order for the given amount; the client completes
    /// payment against the returned reference.
    async fn create_order(
        &self,
        order_id: &OrderId,
        amount: Money,
    ) -> Result<GatewayOrder, CheckoutError>;

    /// Refunds a captured payment, fully or partially.
    async fn refund(
        &self,
        gateway_payment_id: &str,
        amount: Money,
    ) -> Result<GatewayRefund, CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryGatewayState {
    orders: HashMap<String, Money>,
    refunds: Vec<(String, Money)>,
    next_id: u32,
    fail_on_create: bool,
    fail_on_refund: bool,
}

/// In-memory payment gateway for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    state: Arc<RwLock<InMemoryGatewayState>>,
}

impl InMemoryGateway {
    /// Creates a new in-memory gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail order creation.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Configures the gateway to fail refunds.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Returns the number of gateway orders created.
    pub fn order_count(&self) -> usize {
        self.state.read().unwrap().orders.len()
    }

    /// Returns the refunds issued so far.
    pub fn refunds(&self) -> Vec<(String, Money)> {
        self.state.read().unwrap().refunds.clone()
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    async fn create_order(
        &self,
        _order_id: &OrderId,
        amount: Money,
    ) -> Result<GatewayOrder, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(CheckoutError::Gateway("gateway unavailable".to_string()));
        }

        state.next_id += 1;
        let gateway_order_id = format!("gw_order_{:04}", state.next_id);
        state.orders.insert(gateway_order_id.clone(), amount);

        Ok(GatewayOrder {
            gateway_order_id,
            amount,
            currency: "INR".to_string(),
        })
    }

    async fn refund(
        &self,
        gateway_payment_id: &str,
        amount: Money,
    ) -> Result<GatewayRefund, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_refund {
            return Err(CheckoutError::Gateway("refund rejected".to_string()));
        }

        state.next_id += 1;
        let refund_id = format!("gw_refund_{:04}", state.next_id);
        state.refunds.push((gateway_payment_id.to_string(), amount));

        Ok(GatewayRefund { refund_id, amount })
    }
}
