use common::{Money, ProductId};
use serde::{Deserialize, Serialize};

/// A color variant of a product with its own stock pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorVariant {
    pub name: String,
    /// Optional hex code for display.
    pub code: Option<String>,
    pub stock: u32,
}

impl ColorVariant {
    pub fn new(name: impl Into<String>, stock: u32) -> Self {
        Self {
            name: name.into(),
            code: None,
            stock,
        }
    }
}

/// A catalog product.
///
/// When color variants exist, the per-color stock counts are the source
/// of truth and `stock` is kept as their sum; when there are none,
/// `stock` stands alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: u32,
    pub colors: Vec<ColorVariant>,
    /// Harmonized tariff code sent to the carrier.
    pub hsn_code: Option<String>,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            stock,
            colors: Vec::new(),
            hsn_code: None,
        }
    }

    pub fn with_colors(mut self, colors: Vec<ColorVariant>) -> Self {
        self.colors = colors;
        self.recompute_aggregate();
        self
    }

    fn recompute_aggregate(&mut self) {
        if !self.colors.is_empty() {
            self.stock = self.colors.iter().map(|c| c.stock).sum();
        }
    }

    fn color_mut(&mut self, name: &str) -> Option<&mut ColorVariant> {
        self.colors.iter_mut().find(|c| c.name == name)
    }

    /// Stock available for the requested variant. Falls back to the
    /// aggregate count when no color is requested or the named color does
    /// not exist.
    pub fn available_stock(&self, color: Option<&str>) -> u32 {
        match color {
            Some(name) => self
                .colors
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.stock)
                .unwrap_or(self.stock),
            None => self.stock,
        }
    }

    /// Deducts `quantity` from the selected stock pool only if enough is
    /// available. Returns false, leaving the product untouched, otherwise.
    pub fn try_decrement(&mut self, color: Option<&str>, quantity: u32) -> bool {
        match color.and_then(|name| self.color_mut(name)) {
            Some(variant) => {
                if variant.stock < quantity {
                    return false;
                }
                variant.stock -= quantity;
                self.recompute_aggregate();
                true
            }
            None => {
                if self.stock < quantity {
                    return false;
                }
                self.stock -= quantity;
                true
            }
        }
    }

    /// Returns `quantity` to the selected stock pool. Restoration is
    /// unconditional; a restore that races a catalog edit favors
    /// overstating availability over stranding paid-for stock.
    pub fn restore(&mut self, color: Option<&str>, quantity: u32) {
        match color.and_then(|name| self.color_mut(name)) {
            Some(variant) => {
                variant.stock += quantity;
                self.recompute_aggregate();
            }
            None => {
                self.stock += quantity;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shirt() -> Product {
        Product::new(ProductId::new("SKU-1"), "Shirt", Money::from_major(100), 0).with_colors(vec![
            ColorVariant::new("red", 4),
            ColorVariant::new("blue", 6),
        ])
    }

    #[test]
    fn aggregate_is_sum_of_colors() {
        assert_eq!(shirt().stock, 10);
    }

    #[test]
    fn decrement_named_color() {
        let mut p = shirt();
        assert!(p.try_decrement(Some("red"), 3));
        assert_eq!(p.available_stock(Some("red")), 1);
        assert_eq!(p.stock, 7);
    }

    #[test]
    fn decrement_fails_without_enough_stock() {
        let mut p = shirt();
        assert!(!p.try_decrement(Some("red"), 5));
        assert_eq!(p.available_stock(Some("red")), 4);
        assert_eq!(p.stock, 10);
    }

    #[test]
    fn unknown_color_uses_aggregate_pool() {
        let mut p = Product::new(ProductId::new("SKU-2"), "Mug", Money::from_major(10), 8);
        assert_eq!(p.available_stock(Some("green")), 8);
        assert!(p.try_decrement(Some("green"), 2));
        assert_eq!(p.stock, 6);
    }

    #[test]
    fn restore_is_unconditional() {
        let mut p = shirt();
        p.restore(Some("blue"), 5);
        assert_eq!(p.available_stock(Some("blue")), 11);
        assert_eq!(p.stock, 15);
    }
}
