use chrono::{DateTime, Utc};
use common::{Money, OrderId, ShipmentId, UserId};
use serde::{Deserialize, Serialize};

/// Carrier-side status of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingStatus {
    #[default]
    Pending,
    Confirmed,
    PickedUp,
    InTransit,
    OutForDelivery,
    Delivered,
    Cancelled,
    Returned,
}

impl ShippingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingStatus::Pending => "pending",
            ShippingStatus::Confirmed => "confirmed",
            ShippingStatus::PickedUp => "picked_up",
            ShippingStatus::InTransit => "in_transit",
            ShippingStatus::OutForDelivery => "out_for_delivery",
            ShippingStatus::Delivered => "delivered",
            ShippingStatus::Cancelled => "cancelled",
            ShippingStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for ShippingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A carrier booking recorded alongside the order.
///
/// `carrier_order_id` is the carrier's own order reference; cancellation
/// must be issued against it, not against the shipment id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: ShipmentId,
    pub order_id: OrderId,
    pub carrier_order_id: Option<String>,
    pub user_id: UserId,
    pub shipping_status: ShippingStatus,
    pub awb_number: Option<String>,
    pub courier_name: Option<String>,
    pub courier_company_id: Option<String>,
    pub shipping_charges: Money,
    pub label_url: Option<String>,
    pub manifest_url: Option<String>,
    /// Raw carrier response, kept for audits and support tooling.
    pub carrier_response: serde_json::Value,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Shipment {
    pub fn is_cancelled(&self) -> bool {
        self.shipping_status == ShippingStatus::Cancelled
    }

    pub fn mark_cancelled(
        &mut self,
        reason: Option<String>,
        by: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.shipping_status = ShippingStatus::Cancelled;
        self.cancelled_at = Some(now);
        self.cancelled_by = Some(by.into());
        self.cancellation_reason = reason;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_stamps_metadata() {
        let mut shipment = Shipment {
            shipment_id: ShipmentId::new("ship_1"),
            order_id: OrderId::new("ORD-20260830-ABC123"),
            carrier_order_id: Some("carrier_42".into()),
            user_id: UserId::new(),
            shipping_status: ShippingStatus::Confirmed,
            awb_number: Some("AWB123".into()),
            courier_name: Some("BlueDart".into()),
            courier_company_id: None,
            shipping_charges: Money::from_major(50),
            label_url: None,
            manifest_url: None,
            carrier_response: serde_json::Value::Null,
            cancelled_at: None,
            cancelled_by: None,
            cancellation_reason: None,
            created_at: Utc::now(),
        };
        shipment.mark_cancelled(Some("order cancelled".into()), "system", Utc::now());
        assert!(shipment.is_cancelled());
        assert_eq!(shipment.cancelled_by.as_deref(), Some("system"));
    }
}
