//! Shipment orchestration against the carrier.

use chrono::Utc;
use common::OrderId;
use domain::{Order, OrderError, PaymentMethod, Shipment, ShippingStatus};
use store::{Backend, StoreError};

use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, Result};
use crate::services::carrier::{BookingItem, BookingRequest, CarrierService, Consignee};
use crate::services::notifier::{Notification, Notifier, send_best_effort};

/// Books and cancels carrier shipments for orders.
#[derive(Clone)]
pub struct ShippingService<B, C, N> {
    store: B,
    carrier: C,
    notifier: N,
    config: CheckoutConfig,
}

impl<B, C, N> ShippingService<B, C, N>
where
    B: Backend,
    C: CarrierService,
    N: Notifier,
{
    pub fn new(store: B, carrier: C, notifier: N, config: CheckoutConfig) -> Self {
        Self {
            store,
            carrier,
            notifier,
            config,
        }
    }

    /// Books a shipment for the order.
    ///
    /// Fails when the address is missing carrier-required fields or when
    /// a shipment already exists, checked both on the order and in the
    /// shipment collection.
    #[tracing::instrument(skip(self))]
    pub async fn create_shipment(&self, order_id: &OrderId) -> Result<Shipment> {
        metrics::counter!("shipments_created_total").increment(1);

        let mut order = self
            .store
            .get_order(order_id)
            .await?
            .ok_or_else(|| CheckoutError::OrderNotFound(order_id.clone()))?;

        let missing = order.shipping_address.missing_shipment_fields();
        if !missing.is_empty() {
            return Err(OrderError::MissingShippingData { fields: missing }.into());
        }

        if order.has_shipment() || self.store.shipment_for_order(order_id).await?.is_some() {
            return Err(CheckoutError::ShipmentExists(order_id.clone()));
        }

        let request = self.booking_request(&order).await?;
        let booking = self.carrier.book_shipment(&request).await?;

        let shipment = Shipment {
            shipment_id: booking.shipment_id,
            order_id: order_id.clone(),
            carrier_order_id: Some(booking.carrier_order_id),
            user_id: order.customer.user_id(),
            shipping_status: ShippingStatus::Confirmed,
            awb_number: booking.awb_number,
            courier_name: booking.courier_name,
            courier_company_id: booking.courier_company_id,
            shipping_charges: booking.shipping_charges,
            label_url: booking.label_url,
            manifest_url: booking.manifest_url,
            carrier_response: booking.raw,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            created_at: Utc::now(),
        };

        let shipment = self
            .store
            .insert_shipment(shipment)
            .await
            .map_err(|e| match e {
                StoreError::DuplicateShipment(id) => CheckoutError::ShipmentExists(id),
                other => other.into(),
            })?;

        order.attach_shipment(
            shipment.shipment_id.clone(),
            shipment.awb_number.clone(),
            shipment.courier_name.clone(),
        );
        self.store.update_order(&order).await?;

        if let Some(email) = order.contact_email() {
            send_best_effort(
                &self.notifier,
                Notification::ShipmentBooked {
                    order_id: order_id.clone(),
                    email: email.to_string(),
                    awb_number: shipment.awb_number.clone(),
                },
            )
            .await;
        }

        tracing::info!(order_id = %order_id, shipment_id = %shipment.shipment_id, "shipment booked");
        Ok(shipment)
    }

    async fn booking_request(&self, order: &Order) -> Result<BookingRequest> {
        let address = &order.shipping_address;
        let consignee = Consignee {
            name: address
                .name
                .clone()
                .unwrap_or_else(|| order.customer.display_name().to_string()),
            email: order.contact_email().map(str::to_string),
            phone: address.phone.clone(),
            address: address.address.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            country: address.country.clone(),
            postal_code: address.postal_code().unwrap_or_default().to_string(),
        };

        let mut items = Vec::with_capacity(order.lines.len());
        for line in &order.lines {
            let hsn_code = self
                .store
                .get_product(&line.product_id)
                .await?
                .and_then(|p| p.hsn_code)
                .unwrap_or_else(|| self.config.default_hsn_code.clone());
            items.push(BookingItem {
                name: line.name.clone(),
                sku: line.product_id.as_str().to_string(),
                units: line.quantity,
                unit_price: line.unit_price,
                hsn_code,
            });
        }

        let payment_mode = if order.payment_method == PaymentMethod::Cod {
            "COD"
        } else {
            "Prepaid"
        };

        Ok(BookingRequest {
            order_id: order.order_id.clone(),
            pickup_location: self.config.pickup_location.clone(),
            consignee,
            items,
            payment_mode: payment_mode.to_string(),
            sub_total: order.pricing.total_amount,
            length_cm: self.config.package.length_cm,
            breadth_cm: self.config.package.breadth_cm,
            height_cm: self.config.package.height_cm,
            weight_kg: self.config.package.weight_kg,
        })
    }

    /// Cancels the order's shipment with the carrier.
    ///
    /// Idempotent: an already-cancelled shipment, locally or on the
    /// carrier's side, is treated as success.
    #[tracing::instrument(skip(self, reason))]
    pub async fn cancel_shipment(
        &self,
        order_id: &OrderId,
        by: &str,
        reason: Option<String>,
    ) -> Result<Shipment> {
        let mut shipment = self
            .store
            .shipment_for_order(order_id)
            .await?
            .ok_or_else(|| CheckoutError::NoShipment(order_id.clone()))?;

        if shipment.is_cancelled() {
            return Ok(shipment);
        }

        match &shipment.carrier_order_id {
            Some(carrier_order_id) => {
                match self.carrier.cancel_shipment(carrier_order_id).await {
                    Ok(()) => {}
                    Err(CheckoutError::Carrier(message))
                        if message.contains("already cancelled") =>
                    {
                        tracing::debug!(%order_id, "carrier reports shipment already cancelled");
                    }
                    Err(error) => return Err(error),
                }
            }
            None => {
                tracing::warn!(%order_id, "no carrier order reference, skipping carrier cancel");
            }
        }

        shipment.mark_cancelled(reason, by, Utc::now());
        self.store.update_shipment(&shipment).await?;
        metrics::counter!("shipments_cancelled_total").increment(1);
        Ok(shipment)
    }

    /// Best-effort shipment cancellation used when the order itself is
    /// cancelled. A missing shipment is fine; any other failure is
    /// logged and swallowed so the order cancellation still lands.
    pub async fn cancel_for_order_soft(&self, order_id: &OrderId, by: &str) {
        match self
            .cancel_shipment(order_id, by, Some("order cancelled".to_string()))
            .await
        {
            Ok(_) | Err(CheckoutError::NoShipment(_)) => {}
            Err(error) => {
                tracing::warn!(%order_id, %error, "shipment auto-cancel failed");
            }
        }
    }
}
