//! Shipping carrier trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, OrderId, ShipmentId};

use crate::error::CheckoutError;

/// One item line in a carrier booking.
#[derive(Debug, Clone)]
pub struct BookingItem {
    pub name: String,
    pub sku: String,
    pub units: u32,
    pub unit_price: Money,
    pub hsn_code: String,
}

/// Consignee details sent to the carrier.
#[derive(Debug, Clone)]
pub struct Consignee {
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: String,
}

/// The full booking payload sent to the carrier.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub order_id: OrderId,
    pub pickup_location: String,
    pub consignee: Consignee,
    pub items: Vec<BookingItem>,
    /// `"Prepaid"` or `"COD"`.
    pub payment_mode: String,
    pub sub_total: Money,
    pub length_cm: f64,
    pub breadth_cm: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
}

/// A successful carrier booking.
#[derive(Debug, Clone)]
pub struct ShipmentBooking {
    pub shipment_id: ShipmentId,
    /// The carrier's own order reference. Cancellations are issued
    /// against this, not the shipment id.
    pub carrier_order_id: String,
    pub awb_number: Option<String>,
    pub courier_name: Option<String>,
    pub courier_company_id: Option<String>,
    pub shipping_charges: Money,
    pub label_url: Option<String>,
    pub manifest_url: Option<String>,
    /// Raw carrier response, stored with the shipment.
    pub raw: serde_json::Value,
}

/// Trait for shipping carrier operations.
#[async_trait]
pub trait CarrierService: Send + Sync {
    /// Books a shipment with the carrier.
    async fn book_shipment(&self, request: &BookingRequest)
    -> Result<ShipmentBooking, CheckoutError>;

    /// Cancels a booking by the carrier's order reference.
    async fn cancel_shipment(&self, carrier_order_id: &str) -> Result<(), CheckoutError>;
}

#[derive(Debug, Default)]
struct InMemoryCarrierState {
    // carrier_order_id -> cancelled
    bookings: HashMap<String, bool>,
    next_id: u32,
    fail_on_book: bool,
    fail_on_cancel: bool,
}

/// In-memory carrier for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCarrier {
    state: Arc<RwLock<InMemoryCarrierState>>,
}

impl InMemoryCarrier {
    /// Creates a new in-memory carrier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the carrier to fail bookings.
    pub fn set_fail_on_book(&self, fail: bool) {
        self.state.write().unwrap().fail_on_book = fail;
    }

    /// Configures the carrier to fail cancellations.
    pub fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().unwrap().fail_on_cancel = fail;
    }

    /// Returns the number of active (non-cancelled) bookings.
    pub fn active_booking_count(&self) -> usize {
        self.state
            .read()
            .unwrap()
            .bookings
            .values()
            .filter(|cancelled| !**cancelled)
            .count()
    }

    /// Returns true if the booking exists and is cancelled.
    pub fn is_cancelled(&self, carrier_order_id: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .bookings
            .get(carrier_order_id)
            .copied()
            .unwrap_or(false)
    }
}

#[async_trait]
impl CarrierService for InMemoryCarrier {
    async fn book_shipment(
        &self,
        request: &BookingRequest,
    ) -> Result<ShipmentBooking, CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_book {
            return Err(CheckoutError::Carrier("booking rejected".to_string()));
        }

        state.next_id += 1;
        let carrier_order_id = format!("carrier_{:04}", state.next_id);
        state.bookings.insert(carrier_order_id.clone(), false);

        Ok(ShipmentBooking {
            shipment_id: ShipmentId::new(format!("ship_{:04}", state.next_id)),
            carrier_order_id,
            awb_number: Some(format!("AWB{:08}", state.next_id)),
            courier_name: Some("Test Courier".to_string()),
            courier_company_id: Some("42".to_string()),
            shipping_charges: Money::zero(),
            label_url: None,
            manifest_url: None,
            raw: serde_json::json!({
                "order_id": request.order_id.as_str(),
                "payment_mode": request.payment_mode,
            }),
        })
    }

    async fn cancel_shipment(&self, carrier_order_id: &str) -> Result<(), CheckoutError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_cancel {
            return Err(CheckoutError::Carrier("cancel rejected".to_string()));
        }

        match state.bookings.get_mut(carrier_order_id) {
            Some(cancelled) if *cancelled => Err(CheckoutError::Carrier(
                "shipment already cancelled".to_string(),
            )),
            Some(cancelled) => {
                *cancelled = true;
                Ok(())
            }
            None => Err(CheckoutError::Carrier(format!(
                "unknown booking: {carrier_order_id}"
            ))),
        }
    }
}
