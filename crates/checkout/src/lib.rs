//! Checkout orchestration for the storefront backend.
//!
//! Ties the domain model and stores together into the operational
//! flows: cart management, order placement, payment reconciliation
//! (gateway orders, signature verification, failures, refunds), shipment
//! booking and cancellation, and admin/user status changes. External
//! systems (payment gateway, shipping carrier, notification channel) sit
//! behind traits with in-memory implementations for tests.

pub mod cart_ops;
pub mod config;
mod credentials;
mod error;
pub mod orders;
pub mod payment;
pub mod services;
pub mod shipping;
pub mod signature;
pub mod status;
mod stock;

pub use cart_ops::CartService;
pub use config::{CheckoutConfig, PackageDefaults};
pub use error::{CheckoutError, Result};
pub use orders::{NewOrderItem, OrderService, OrderSource, PlaceOrder};
pub use payment::{PaymentOutcome, PaymentService, ShipmentAttempt, VerifyPayment};
pub use services::{
    BookingItem, BookingRequest, CarrierService, Consignee, GatewayOrder, GatewayRefund,
    InMemoryCarrier, InMemoryGateway, InMemoryNotifier, Notification, Notifier, PaymentGateway,
    ShipmentBooking,
};
pub use shipping::ShippingService;
pub use status::{Actor, StatusService};
