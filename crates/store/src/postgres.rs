use async_trait::async_trait;
use common::{OrderId, ProductId, ShipmentId, UserId};
use domain::{Cart, Order, Product, Shipment};
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{
    Result, StoreError,
    account::Account,
    repository::{AccountStore, CartStore, OrderStore, ProductStore, ShipmentStore},
};

/// PostgreSQL-backed document store implementation.
///
/// Documents are stored as JSONB with the keys that carry constraints
/// (order id, serial, shipment's order id, account email) lifted into
/// columns so uniqueness and the serial sequence are enforced by the
/// database.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new PostgreSQL store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_doc<T: serde::de::DeserializeOwned>(row: PgRow) -> Result<T> {
        let doc: serde_json::Value = row.try_get("doc")?;
        Ok(serde_json::from_value(doc)?)
    }
}

#[async_trait]
impl OrderStore for PostgresStore {
    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id))]
    async fn insert_order(&self, mut order: Order) -> Result<Order> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            INSERT INTO orders (order_id, user_id, doc, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING serial
            "#,
        )
        .bind(order.order_id.as_str())
        .bind(order.customer.user_id().as_uuid())
        .bind(serde_json::to_value(&order)?)
        .bind(order.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_pkey")
            {
                return StoreError::DuplicateOrderId(order.order_id.clone());
            }
            StoreError::Database(e)
        })?;

        // Re-serialize with the database-assigned serial folded in.
        order.serial = row.try_get::<i64, _>("serial")? as u64;
        sqlx::query("UPDATE orders SET doc = $2 WHERE order_id = $1")
            .bind(order.order_id.as_str())
            .bind(serde_json::to_value(&order)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        metrics::counter!("store_orders_inserted_total").increment(1);
        Ok(order)
    }

    async fn get_order(&self, order_id: &OrderId) -> Result<Option<Order>> {
        let row = sqlx::query("SELECT doc FROM orders WHERE order_id = $1")
            .bind(order_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_doc).transpose()
    }

    async fn update_order(&self, order: &Order) -> Result<()> {
        let result = sqlx::query("UPDATE orders SET doc = $2 WHERE order_id = $1")
            .bind(order.order_id.as_str())
            .bind(serde_json::to_value(order)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::OrderNotFound(order.order_id.clone()));
        }
        Ok(())
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT doc FROM orders
            WHERE user_id = $1
            ORDER BY serial DESC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_doc).collect()
    }

    async fn order_id_exists(&self, order_id: &OrderId) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE order_id = $1)")
                .bind(order_id.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }
}

#[async_trait]
impl ProductStore for PostgresStore {
    async fn get_product(&self, product_id: &ProductId) -> Result<Option<Product>> {
        let row = sqlx::query("SELECT doc FROM products WHERE product_id = $1")
            .bind(product_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_doc).transpose()
    }

    async fn upsert_product(&self, product: Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO products (product_id, doc)
            VALUES ($1, $2)
            ON CONFLICT (product_id) DO UPDATE SET doc = EXCLUDED.doc
            "#,
        )
        .bind(product.id.as_str())
        .bind(serde_json::to_value(&product)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn try_decrement_stock(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<bool> {
        // Row lock makes check-and-deduct atomic across writers.
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT doc FROM products WHERE product_id = $1 FOR UPDATE")
            .bind(product_id.as_str())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::ProductNotFound(product_id.clone()))?;

        let mut product: Product = Self::row_to_doc(row)?;
        if !product.try_decrement(color, quantity) {
            tracing::debug!(product_id = %product_id, quantity, "stock decrement refused");
            return Ok(false);
        }

        sqlx::query("UPDATE products SET doc = $2 WHERE product_id = $1")
            .bind(product_id.as_str())
            .bind(serde_json::to_value(&product)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        metrics::counter!("store_stock_decrements_total").increment(1);
        Ok(true)
    }

    #[tracing::instrument(skip(self))]
    async fn restore_stock(
        &self,
        product_id: &ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let Some(row) = sqlx::query("SELECT doc FROM products WHERE product_id = $1 FOR UPDATE")
            .bind(product_id.as_str())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(());
        };

        let mut product: Product = Self::row_to_doc(row)?;
        product.restore(color, quantity);

        sqlx::query("UPDATE products SET doc = $2 WHERE product_id = $1")
            .bind(product_id.as_str())
            .bind(serde_json::to_value(&product)?)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CartStore for PostgresStore {
    async fn get_cart(&self, user_id: UserId) -> Result<Option<Cart>> {
        let row = sqlx::query("SELECT doc FROM carts WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_doc).transpose()
    }

    async fn save_cart(&self, cart: &Cart) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO carts (user_id, doc)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET doc = EXCLUDED.doc
            "#,
        )
        .bind(cart.user_id.as_uuid())
        .bind(serde_json::to_value(cart)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_cart(&self, user_id: UserId) -> Result<()> {
        sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ShipmentStore for PostgresStore {
    #[tracing::instrument(skip(self, shipment), fields(order_id = %shipment.order_id))]
    async fn insert_shipment(&self, shipment: Shipment) -> Result<Shipment> {
        sqlx::query(
            r#"
            INSERT INTO shipments (shipment_id, order_id, doc, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(shipment.shipment_id.as_str())
        .bind(shipment.order_id.as_str())
        .bind(serde_json::to_value(&shipment)?)
        .bind(shipment.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("shipments_order_id_key")
            {
                return StoreError::DuplicateShipment(shipment.order_id.clone());
            }
            StoreError::Database(e)
        })?;

        Ok(shipment)
    }

    async fn get_shipment(&self, shipment_id: &ShipmentId) -> Result<Option<Shipment>> {
        let row = sqlx::query("SELECT doc FROM shipments WHERE shipment_id = $1")
            .bind(shipment_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_doc).transpose()
    }

    async fn shipment_for_order(&self, order_id: &OrderId) -> Result<Option<Shipment>> {
        let row = sqlx::query("SELECT doc FROM shipments WHERE order_id = $1")
            .bind(order_id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_doc).transpose()
    }

    async fn update_shipment(&self, shipment: &Shipment) -> Result<()> {
        let result = sqlx::query("UPDATE shipments SET doc = $2 WHERE shipment_id = $1")
            .bind(shipment.shipment_id.as_str())
            .bind(serde_json::to_value(shipment)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::ShipmentNotFound(shipment.shipment_id.clone()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for PostgresStore {
    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query("SELECT doc FROM accounts WHERE email = $1")
            .bind(email.to_ascii_lowercase())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_doc).transpose()
    }

    async fn insert_account(&self, account: Account) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO accounts (email, user_id, doc, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(account.email.to_ascii_lowercase())
        .bind(account.user_id.as_uuid())
        .bind(serde_json::to_value(&account)?)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("accounts_pkey")
            {
                return StoreError::DuplicateAccount(account.email.clone());
            }
            StoreError::Database(e)
        })?;

        Ok(())
    }

    async fn update_account(&self, account: &Account) -> Result<()> {
        let result = sqlx::query("UPDATE accounts SET doc = $2 WHERE email = $1")
            .bind(account.email.to_ascii_lowercase())
            .bind(serde_json::to_value(account)?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AccountNotFound(account.email.clone()));
        }
        Ok(())
    }
}
