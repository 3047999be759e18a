//! Domain model for the storefront backend.
//!
//! This crate holds the persistent documents (orders, carts, products,
//! shipments) and the rules that govern them: the order status state
//! machine, pricing computation, stock selection across color variants,
//! and the registered/guest customer distinction. It has no I/O; the
//! `store` crate persists these types and the `checkout` crate drives
//! them.

mod address;
mod cart;
mod customer;
mod error;
mod order;
mod pricing;
mod product;
mod shipment;
mod status;

pub use address::ShippingAddress;
pub use cart::{Cart, CartItem};
pub use customer::{ContactInfo, Customer};
pub use error::OrderError;
pub use order::{Order, OrderLine, Refund, RefundKind, StatusChange};
pub use pricing::{PricingBreakdown, PricingConfig};
pub use product::{ColorVariant, Product};
pub use shipment::{Shipment, ShippingStatus};
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};
