//! Payment reconciliation: gateway orders, verification, failures, and
//! refunds.

use chrono::Utc;
use common::{Money, OrderId, ProductId, UserId};
use domain::{ContactInfo, Customer, Order, PaymentStatus, Refund, RefundKind, Shipment};
use store::{Account, Backend, StoreError};

use crate::config::CheckoutConfig;
use crate::credentials;
use crate::error::{CheckoutError, Result};
use crate::services::carrier::CarrierService;
use crate::services::gateway::{GatewayOrder, PaymentGateway};
use crate::services::notifier::{Notification, Notifier, send_best_effort};
use crate::shipping::ShippingService;
use crate::signature;
use crate::stock;

/// Command to verify a captured payment against its signature.
#[derive(Debug, Clone)]
pub struct VerifyPayment {
    pub order_id: OrderId,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    /// Hex HMAC-SHA256 over `"{gateway_order_id}|{gateway_payment_id}"`.
    pub signature: String,
}

/// What happened to the post-payment shipment booking.
#[derive(Debug)]
pub enum ShipmentAttempt {
    Created(Shipment),
    /// Booking was not attempted or not applicable.
    Skipped(String),
    /// Booking was attempted and failed; the payment still stands.
    Failed(String),
}

/// Result of a verification run.
#[derive(Debug)]
pub struct PaymentOutcome {
    pub order: Order,
    /// True when the payment had already been verified and this call
    /// changed nothing.
    pub already_verified: bool,
    /// Lines whose stock deduction was skipped for lack of stock.
    pub skipped_products: Vec<ProductId>,
    pub shipment: ShipmentAttempt,
}

/// Drives the payment lifecycle for prepaid orders.
#[derive(Clone)]
pub struct PaymentService<B, G, C, N> {
    store: B,
    gateway: G,
    shipping: ShippingService<B, C, N>,
    notifier: N,
    config: CheckoutConfig,
}

impl<B, G, C, N> PaymentService<B, G, C, N>
where
    B: Backend,
    G: PaymentGateway,
    C: CarrierService,
    N: Notifier + Clone,
{
    pub fn new(store: B, gateway: G, carrier: C, notifier: N, config: CheckoutConfig) -> Self {
        let shipping =
            ShippingService::new(store.clone(), carrier, notifier.clone(), config.clone());
        Self {
            store,
            gateway,
            shipping,
            notifier,
            config,
        }
    }

    /// Creates a gateway order the client pays against. Rejected when the
    /// order is already paid.
    #[tracing::instrument(skip(self))]
    pub async fn create_gateway_order(&self, order_id: &OrderId) -> Result<GatewayOrder> {
        let mut order = self.load_order(order_id).await?;
        if !order.requires_payment() {
            return Err(CheckoutError::AlreadyPaid(order_id.clone()));
        }

        let gateway_order = self
            .gateway
            .create_order(order_id, order.pricing.final_amount)
            .await?;

        order.gateway_order_id = Some(gateway_order.gateway_order_id.clone());
        self.store.update_order(&order).await?;
        Ok(gateway_order)
    }

    /// Verifies a payment signature and reconciles the order.
    ///
    /// On first verification this deducts stock (skipping lines that can
    /// no longer be covered), promotes a guest customer to an account,
    /// and attempts a shipment booking, none of which can fail the
    /// verification itself. A replay is detected and returns without
    /// touching stock.
    #[tracing::instrument(skip(self, cmd), fields(order_id = %cmd.order_id))]
    pub async fn verify_payment(&self, cmd: VerifyPayment) -> Result<PaymentOutcome> {
        let mut order = self.load_order(&cmd.order_id).await?;

        if !signature::verify(
            &self.config.payment_secret,
            &cmd.gateway_order_id,
            &cmd.gateway_payment_id,
            &cmd.signature,
        ) {
            metrics::counter!("payment_signature_failures_total").increment(1);
            return Err(CheckoutError::InvalidSignature(cmd.order_id));
        }

        let now = Utc::now();
        if order.mark_paid(cmd.gateway_payment_id.clone(), now) {
            tracing::info!(order_id = %order.order_id, "payment already verified, skipping");
            return Ok(PaymentOutcome {
                order,
                already_verified: true,
                skipped_products: Vec::new(),
                shipment: ShipmentAttempt::Skipped("already verified".to_string()),
            });
        }

        metrics::counter!("payments_verified_total").increment(1);

        // Prepaid stock is deducted only now that the money is real.
        let skipped_products = if order.payment_method.is_prepaid() {
            stock::deduct_lines_lenient(&self.store, &order.lines).await?
        } else {
            Vec::new()
        };

        if order.gateway_order_id.is_none() {
            order.gateway_order_id = Some(cmd.gateway_order_id);
        }

        if order.customer.is_guest() {
            self.promote_guest(&mut order).await?;
        }

        self.store.update_order(&order).await?;

        if let Some(email) = order.contact_email() {
            send_best_effort(
                &self.notifier,
                Notification::PaymentReceipt {
                    order_id: order.order_id.clone(),
                    email: email.to_string(),
                    amount: order.pricing.final_amount,
                },
            )
            .await;
        }

        let shipment = self.attempt_shipment(&order.order_id).await;
        // Booking may have attached shipment details; return fresh state.
        let order = self.load_order(&cmd.order_id).await?;

        Ok(PaymentOutcome {
            order,
            already_verified: false,
            skipped_products,
            shipment,
        })
    }

    async fn attempt_shipment(&self, order_id: &OrderId) -> ShipmentAttempt {
        match self.shipping.create_shipment(order_id).await {
            Ok(shipment) => ShipmentAttempt::Created(shipment),
            Err(CheckoutError::ShipmentExists(_)) => {
                ShipmentAttempt::Skipped("shipment already exists".to_string())
            }
            Err(CheckoutError::Order(e)) => ShipmentAttempt::Skipped(e.to_string()),
            Err(error) => {
                tracing::warn!(%order_id, %error, "shipment booking failed after payment");
                ShipmentAttempt::Failed(error.to_string())
            }
        }
    }

    /// Converts a guest order into a registered one. A fresh temporary
    /// password is issued either way: a new account is created when the
    /// guest's email is unknown, and an existing account has its
    /// credential overwritten so the mailed password works.
    async fn promote_guest(&self, order: &mut Order) -> Result<()> {
        let contact = order.customer.contact().clone();
        let email = if !contact.email.is_empty() {
            contact.email.clone()
        } else {
            match order.shipping_address.email.clone().filter(|e| !e.is_empty()) {
                Some(email) => email,
                None => {
                    tracing::warn!(order_id = %order.order_id, "guest has no email, skipping promotion");
                    return Ok(());
                }
            }
        };

        let temp_password = credentials::temp_password(&email);

        let user_id = match self.store.find_account_by_email(&email).await? {
            Some(account) => self.reissue_credential(account, &temp_password).await?,
            None => {
                let user_id = order.customer.user_id();
                let account = Account {
                    user_id,
                    name: contact.name.clone(),
                    email: email.clone(),
                    password_digest: credentials::digest_password(&temp_password),
                    created_at: Utc::now(),
                };
                match self.store.insert_account(account).await {
                    Ok(()) => user_id,
                    // Lost a race with a concurrent registration; the
                    // winner's account gets the new credential instead.
                    Err(StoreError::DuplicateAccount(_)) => {
                        match self.store.find_account_by_email(&email).await? {
                            Some(account) => {
                                self.reissue_credential(account, &temp_password).await?
                            }
                            None => user_id,
                        }
                    }
                    Err(error) => return Err(error.into()),
                }
            }
        };

        send_best_effort(
            &self.notifier,
            Notification::GuestCredentials {
                email: email.clone(),
                temp_password,
            },
        )
        .await;

        order.customer = Customer::Registered {
            user_id,
            contact: ContactInfo {
                name: contact.name,
                email,
                phone: contact.phone,
            },
        };
        metrics::counter!("guest_promotions_total").increment(1);
        Ok(())
    }

    async fn reissue_credential(
        &self,
        mut account: Account,
        temp_password: &str,
    ) -> Result<UserId> {
        account.password_digest = credentials::digest_password(temp_password);
        self.store.update_account(&account).await?;
        Ok(account.user_id)
    }

    /// Records a failed capture. The order is cancelled; prepaid stock
    /// was never deducted, so nothing is restored.
    #[tracing::instrument(skip(self))]
    pub async fn payment_failed(&self, order_id: &OrderId) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;
        if order.payment_status == PaymentStatus::Completed {
            return Err(CheckoutError::AlreadyPaid(order_id.clone()));
        }

        order.mark_payment_failed(Utc::now());
        self.store.update_order(&order).await?;
        metrics::counter!("payments_failed_total").increment(1);

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
        Ok(order)
    }

    /// Refunds the captured payment, fully when no amount is given.
    #[tracing::instrument(skip(self))]
    pub async fn refund(&self, order_id: &OrderId, amount: Option<Money>) -> Result<Order> {
        let mut order = self.load_order(order_id).await?;
        let payment_id = order
            .payment_id
            .clone()
            .ok_or_else(|| CheckoutError::NoPaymentOnFile(order_id.clone()))?;

        let amount = amount.unwrap_or(order.pricing.final_amount);
        let kind = if amount >= order.pricing.final_amount {
            RefundKind::Full
        } else {
            RefundKind::Partial
        };

        let gateway_refund = self.gateway.refund(&payment_id, amount).await?;
        order.record_refund(Refund {
            refund_id: gateway_refund.refund_id,
            amount,
            gateway_payment_id: payment_id,
            kind,
            created_at: Utc::now(),
        });
        self.store.update_order(&order).await?;
        metrics::counter!("refunds_issued_total").increment(1);

        if let Some(email) = order.contact_email() {
            send_best_effort(
                &self.notifier,
                Notification::RefundIssued {
                    order_id: order.order_id.clone(),
                    email: email.to_string(),
                    amount,
                },
            )
            .await;
        }
        Ok(order)
    }

    async fn load_order(&self, order_id: &OrderId) -> Result<Order> {
        self.store
            .get_order(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))
    }
}
