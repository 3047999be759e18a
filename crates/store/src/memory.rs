use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use common::{OrderId, ProductId, ShipmentId, UserId};
use domain::{Cart, Order, Product, Shipment};
use tokio::sync::RwLock;

use crate::{
    Result, StoreError,
    account::Account,
    repository::{AccountStore, CartStore, OrderStore, ProductStore, ShipmentStore},
};

/// In-memory store implementation for testing.
///
/// Stores all documents in memory behind `RwLock`s and provides the same
/// interface and error behavior as the PostgreSQL implementation,
/// including duplicate-key rejection and the atomic serial counter.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
    shipments: Arc<RwLock<HashMap<ShipmentId, Shipment>>>,
    accounts: Arc<RwLock<HashMap<String, Account>>>,
    next_serial: Arc<AtomicU64>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            next_serial: Arc::new(AtomicU64::new(1)),
            ..Self::default()
        }
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Seeds a catalog product.
    pub async fn seed_product(&self, product: Product) {
        self.products.write().await.insert(product.id.clone(), product);
    }

    /// Clears all documents.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
        self.products.write().await.clear();
        self.carts.write().await.clear();
        self.shipments.write().await.clear();
        self.accounts.write().await.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, mut order: Order) -> Result<Order> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.order_id) {
            return Err(StoreError::DuplicateOrderId(order.order_id));
        }
        order.serial = self.next_serial.fetch_add(1, Ordering::SeqCst);
        orders.insert(order.order_id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(order_id).cloned())
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if !orders.contains_key(&order.order_id) {
            return Err(StoreError::OrderNotFound(order.order_id.clone()));
        }
        orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<_> = orders
            .values()
            .filter(|o| o.customer.user_id() == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.serial.cmp(&a.serial));
        Ok(result)
    }

    async fn order_id_exists(&self, order_id: &OrderId) -> Result<bool> {
        Ok(self.orders.read().await.contains_key(order_id))
    }
}

#[async_trait]
impl ProductStore for InMemoryStore {
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(product_id).cloned())
    }

    async fn upsert_product(&self, product: Product) -> Result<()> {
        self.products.write().await.insert(product.id.clone(), product);
        Ok(())
    }

    async fn try_decrement_stock(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<bool> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;
        Ok(product.try_decrement(color, quantity))
    }

    async fn restore_stock(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<()> {
        let mut products = self.products.write().await;
        if let Some(product) = products.get_mut(product_id) {
            product.restore(color, quantity);
        }
        Ok(())
    }
}

#[async_trait]
impl CartStore for InMemoryStore {
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.user_id, cart.clone());
        Ok(())
    }

    async fn delete_cart(&self, user_id: UserId) -> Result<()> {
        self.carts.write().await.remove(&user_id);
        Ok(())
    }
}

#[async_trait]
impl ShipmentStore for InMemoryStore {
    async fn insert_shipment(&self, shipment: Shipment) -> Result<Shipment> {
        let mut shipments = self.shipments.write().await;
        // Unique-order-id constraint simulation
        if shipments.values().any(|s| s.order_id == shipment.order_id) {
            return Err(StoreError::DuplicateShipment(shipment.order_id));
        }
        shipments.insert(shipment.shipment_id.clone(), shipment.clone());
        Ok(shipment)
    }

    async fn get_shipment(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>> {
        Ok(self.shipments.read().await.get(shipment_id).cloned())
    }

    async fn shipment_for_order(&self, order_id: &OrderId) -> Result<Option<Shipment>> {
        let shipments = self.shipments.read().await;
        Ok(shipments.values().find(|s| &s.order_id == order_id).cloned())
    }

    async fn update_shipment(&self, shipment: &Shipment) -> Result<()> {
        let mut shipments = self.shipments.write().await;
        if !shipments.contains_key(&shipment.shipment_id) {
            return Err(StoreError::ShipmentNotFound(shipment.shipment_id.clone()));
        }
        shipments.insert(shipment.shipment_id.clone(), shipment.clone());
        Ok(())
    }
}

#[async_trait]
impl AccountStore for InMemoryStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&email.to_ascii_lowercase()).cloned())
    }

    async fn insert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let key = account.email.to_ascii_lowercase();
        if accounts.contains_key(&key) {
            return Err(StoreError::DuplicateAccount(account.email));
        }
        accounts.insert(key, account);
        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let key = account.email.to_ascii_lowercase();
        if !accounts.contains_key(&key) {
            return Err(StoreError::AccountNotFound(account.email.clone()));
        }
        accounts.insert(key, account.clone());
        Ok(())
    }
}
