//! External service traits with in-memory test implementations.

pub mod carrier;
pub mod gateway;
pub mod notifier;

pub use carrier::{
    BookingItem, BookingRequest, CarrierService, Consignee, InMemoryCarrier, ShipmentBooking,
};
pub use gateway::{GatewayOrder, GatewayRefund, InMemoryGateway, PaymentGateway};
pub use notifier::{InMemoryNotifier, Notification, Notifier};
