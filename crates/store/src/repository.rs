use async_trait::async_trait;
use common::{OrderId, ProductId, ShipmentId, UserId};
use domain::{Cart, Order, Product, Shipment};

use crate::{Result, account::Account};

/// Order document store.
///
/// `insert_order` assigns the monotonic serial number and fails with
/// [`crate::StoreError::DuplicateOrderId`] on an id collision, which the
/// checkout layer turns into a regenerate-and-retry.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts a new order, returning it with its serial assigned.
    async fn insert_order(&self, order: Order) -> Result<Order>;

    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>>;

    /// Persists the current state of an existing order.
    async fn update_order(&self, order: &Order) -> Result<()>;

    /// All orders linked to the given account, newest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>>;

    async fn order_id_exists(&self, order_id: &OrderId) -> Result<bool>;
}

/// Product catalog and stock ledger.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>>;

    async fn upsert_product(&self, product: Product) -> Result<()>;

    /// Deducts stock for the selected color pool only if enough is
    /// available, atomically. Returns whether the deduction was applied;
    /// `Ok(false)` means the stock level was left untouched.
    async fn try_decrement_stock(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<bool>;

    /// Returns stock to the selected pool unconditionally. A missing
    /// product is ignored; a restore must never fail a cancellation.
    async fn restore_stock(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<()>;
}

/// Cart documents, one per user.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>>;

    async fn save_cart(&self, cart: &Cart) -> Result<()>;

    async fn delete_cart(&self, user_id: UserId) -> Result<()>;
}

/// Shipment bookings. At most one active shipment per order; a second
/// insert for the same order fails with
/// [`crate::StoreError::DuplicateShipment`].
#[async_trait]
pub trait ShipmentStore: Send + Sync {
    async fn insert_shipment(&self, shipment: Shipment) -> Result<Shipment>;

    async fn get_shipment(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>>;

    async fn shipment_for_order(&self, order_id: &OrderId) -> Result<Option<Shipment>>;

    async fn update_shipment(&self, shipment: &Shipment) -> Result<()>;
}

/// Login accounts, looked up by email during guest promotion.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>>;

    async fn insert_account(&self, account: Account) -> Result<()>;

    /// Persists the current state of an existing account, credential
    /// included.
    async fn update_account(&self, account: &Account) -> Result<()>;
}

/// The full persistence surface the checkout layer runs against.
pub trait Backend:
    OrderStore + ProductStore + CartStore + ShipmentStore + AccountStore + Clone + 'static
{
}

impl<T> Backend for T where
    T: OrderStore + ProductStore + CartStore + ShipmentStore + AccountStore + Clone + 'static
{
}
