//! Checkout configuration loaded from environment variables.

use domain::PricingConfig;

/// Default package dimensions used when booking a shipment without
/// explicit measurements.
#[derive(Debug, Clone, Copy)]
pub struct PackageDefaults {
    pub length_cm: f64,
    pub breadth_cm: f64,
    pub height_cm: f64,
    pub weight_kg: f64,
}

impl Default for PackageDefaults {
    fn default() -> Self {
        Self {
            length_cm: 15.0,
            breadth_cm: 10.0,
            height_cm: 5.0,
            weight_kg: 0.5,
        }
    }
}

/// Checkout configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `PAYMENT_SECRET` — shared secret for gateway signature verification
/// - `PICKUP_LOCATION` — carrier pickup location name (default: `"Primary"`)
/// - `DEFAULT_HSN_CODE` — tariff code for items without one (default: `"999799"`)
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub payment_secret: String,
    pub pricing: PricingConfig,
    pub pickup_location: String,
    pub default_hsn_code: String,
    pub package: PackageDefaults,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            payment_secret: std::env::var("PAYMENT_SECRET").unwrap_or_default(),
            pricing: PricingConfig::default(),
            pickup_location: std::env::var("PICKUP_LOCATION")
                .unwrap_or_else(|_| "Primary".to_string()),
            default_hsn_code: std::env::var("DEFAULT_HSN_CODE")
                .unwrap_or_else(|_| "999799".to_string()),
            package: PackageDefaults::default(),
        }
    }

    /// Configuration for tests, with a fixed signing secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            payment_secret: secret.into(),
            pricing: PricingConfig::default(),
            pickup_location: "Primary".to_string(),
            default_hsn_code: "999799".to_string(),
            package: PackageDefaults::default(),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self::with_secret("")
    }
}
