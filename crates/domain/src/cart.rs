use common::{Money, ProductId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::OrderError;

/// A line in a shopping cart. The price is captured when the item is
/// added so a later catalog change does not silently reprice the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub selected_color: Option<String>,
}

/// A user's cart document. The totals are denormalized and recomputed on
/// every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_price: Money,
}

impl Cart {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            total_items: 0,
            total_price: Money::zero(),
        }
    }

    fn recompute_totals(&mut self) {
        self.total_items = self.items.iter().map(|i| i.quantity).sum();
        self.total_price = self.items.iter().map(|i| i.price.times(i.quantity)).sum();
    }

    fn position(&self, product_id: &ProductId, color: Option<&str>) -> Option<usize> {
        self.items
            .iter()
            .position(|i| &i.product_id == product_id && i.selected_color.as_deref() == color)
    }

    /// Adds an item, merging with an existing line for the same product
    /// and color.
    pub fn add_item(&mut self, item: CartItem) -> Result<(), OrderError> {
        if item.quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity: 0 });
        }
        match self.position(&item.product_id, item.selected_color.as_deref()) {
            Some(idx) => {
                self.items[idx].quantity += item.quantity;
                self.items[idx].price = item.price;
            }
            None => self.items.push(item),
        }
        self.recompute_totals();
        Ok(())
    }

    /// Sets the quantity of an existing line; zero removes the line.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        color: Option<&str>,
        quantity: u32,
    ) -> bool {
        let Some(idx) = self.position(product_id, color) else {
            return false;
        };
        if quantity == 0 {
            self.items.remove(idx);
        } else {
            self.items[idx].quantity = quantity;
        }
        self.recompute_totals();
        true
    }

    pub fn remove_item(&mut self, product_id: &ProductId, color: Option<&str>) -> bool {
        let Some(idx) = self.position(product_id, color) else {
            return false;
        };
        self.items.remove(idx);
        self.recompute_totals();
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute_totals();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
