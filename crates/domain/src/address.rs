use serde::{Deserialize, Serialize};

/// Delivery address captured at checkout.
///
/// Older clients send `pincode` where newer ones send `postal_code`;
/// both are kept and [`ShippingAddress::postal_code`] resolves them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal_code: Option<String>,
    pub pincode: Option<String>,
    pub phone: String,
}

impl ShippingAddress {
    /// Postal code, preferring the modern field over the legacy one.
    pub fn postal_code(&self) -> Option<&str> {
        self.postal_code
            .as_deref()
            .or(self.pincode.as_deref())
            .filter(|code| !code.is_empty())
    }

    /// Names every field a carrier booking requires that is absent or
    /// empty. An empty result means the address is shippable.
    pub fn missing_shipment_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for (name, value) in [
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("country", &self.country),
            ("phone", &self.phone),
        ] {
            if value.trim().is_empty() {
                missing.push(name.to_string());
            }
        }
        if self.postal_code().is_none() {
            missing.push("postal_code".to_string());
        }
        missing
    }
}
