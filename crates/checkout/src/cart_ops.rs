//! Cart operations backed by the cart and product stores.

use common::{ProductId, UserId};
use domain::{Cart, CartItem, OrderError};
use store::Backend;

use crate::error::{CheckoutError, Result};

/// Manages per-user carts, validating items against the catalog.
#[derive(Clone)]
pub struct CartService<B> {
    store: B,
}

impl<B: Backend> CartService<B> {
    pub fn new(store: B) -> Self {
        Self { store }
    }

    /// The user's cart, or a fresh empty one.
    pub async fn get_cart(&self, user_id: UserId) -> Result<Cart> {
        Ok(self
            .store
            .get_cart(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id)))
    }

    /// Adds an item to the cart, capturing the current catalog price.
    ///
    /// The requested quantity, on top of what the cart already holds for
    /// the same product and color, must be covered by live stock.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
        selected_color: Option<String>,
    ) -> Result<Cart> {
        let product = self
            .store
            .get_product(&product_id)
            .await?
            .ok_or_else(|| CheckoutError::ProductNotFound(product_id.clone()))?;

        let mut cart = self.get_cart(user_id).await?;

        let color = selected_color.as_deref();
        let in_cart: u32 = cart
            .items
            .iter()
            .filter(|i| i.product_id == product_id && i.selected_color.as_deref() == color)
            .map(|i| i.quantity)
            .sum();
        let available = product.available_stock(color);
        if available < in_cart + quantity {
            return Err(CheckoutError::Order(OrderError::InsufficientStock {
                product: product_id,
                requested: in_cart + quantity,
                available,
            }));
        }

        cart.add_item(CartItem {
            product_id,
            quantity,
            price: product.price,
            selected_color,
        })?;
        self.store.save_cart(&cart).await?;
        Ok(cart)
    }

    /// Sets the quantity of a cart line; zero removes it.
    #[tracing::instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> Result<Cart> {
        if quantity > 0 {
            let product = self
                .store
                .get_product(&product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(product_id.clone()))?;
            let available = product.available_stock(color);
            if available < quantity {
                return Err(CheckoutError::Order(OrderError::InsufficientStock {
                    product: product_id,
                    requested: quantity,
                    available,
                }));
            }
        }

        let mut cart = self.get_cart(user_id).await?;
        cart.update_quantity(&product_id, color, quantity);
        self.store.save_cart(&cart).await?;
        Ok(cart)
    }

    /// Removes a line from the cart.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: &ProductId,
        color: Option<&str>,
    ) -> Result<Cart> {
        let mut cart = self.get_cart(user_id).await?;
        cart.remove_item(product_id, color);
        self.store.save_cart(&cart).await?;
        Ok(cart)
    }

    /// Empties the cart.
    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        self.store.delete_cart(user_id).await?;
        Ok(())
    }
}
