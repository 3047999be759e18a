use common::Money;
use serde::{Deserialize, Serialize};

/// Tunable checkout pricing rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Orders strictly above this subtotal ship free.
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
    /// Tax rate as a whole percentage, applied to the item subtotal.
    pub tax_rate_percent: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_major(500),
            flat_shipping_fee: Money::from_major(50),
            tax_rate_percent: 18,
        }
    }
}

/// Amounts computed at checkout and frozen onto the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub total_amount: Money,
    pub shipping_fee: Money,
    pub tax_amount: Money,
    pub final_amount: Money,
}

impl PricingBreakdown {
    /// Computes shipping, tax, and the charged total from the item
    /// subtotal.
    pub fn compute(total_amount: Money, config: &PricingConfig) -> Self {
        let shipping_fee = if total_amount > config.free_shipping_threshold {
            Money::zero()
        } else {
            config.flat_shipping_fee
        };
        let tax_amount = total_amount.percent(config.tax_rate_percent);
        Self {
            total_amount,
            shipping_fee,
            tax_amount,
            final_amount: total_amount + shipping_fee + tax_amount,
        }
    }

    /// Sanity check used before charging: the stored parts must still add
    /// up.
    pub fn is_consistent(&self) -> bool {
        self.total_amount + self.shipping_fee + self.tax_amount == self.final_amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipping_charged_below_threshold() {
        let breakdown = PricingBreakdown::compute(Money::from_major(200), &PricingConfig::default());
        assert_eq!(breakdown.shipping_fee, Money::from_major(50));
        assert_eq!(breakdown.tax_amount, Money::from_cents(3600));
        assert_eq!(breakdown.final_amount, Money::from_cents(28600));
        assert!(breakdown.is_consistent());
    }

    #[test]
    fn free_shipping_strictly_above_threshold() {
        let config = PricingConfig::default();
        let at = PricingBreakdown::compute(Money::from_major(500), &config);
        assert_eq!(at.shipping_fee, Money::from_major(50));
        let above = PricingBreakdown::compute(Money::from_cents(50001), &config);
        assert!(above.shipping_fee.is_zero());
    }

    #[test]
    fn zero_subtotal() {
        let breakdown = PricingBreakdown::compute(Money::zero(), &PricingConfig::default());
        assert_eq!(breakdown.final_amount, Money::from_major(50));
        assert!(breakdown.is_consistent());
    }
}
