//! Gateway payment signature verification.
//!
//! The gateway signs `"{gateway_order_id}|{gateway_payment_id}"` with
//! HMAC-SHA256 under the shared secret and sends the hex digest back
//! with the payment confirmation.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

fn mac_for(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> Option<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(gateway_order_id.as_bytes());
    mac.update(b"|");
    mac.update(gateway_payment_id.as_bytes());
    Some(mac)
}

/// Computes the hex signature the gateway is expected to send.
pub fn sign(secret: &str, gateway_order_id: &str, gateway_payment_id: &str) -> String {
    match mac_for(secret, gateway_order_id, gateway_payment_id) {
        Some(mac) => hex::encode(mac.finalize().into_bytes()),
        None => String::new(),
    }
}

/// Verifies a signature in constant time. Malformed hex or a bad digest
/// both report false.
pub fn verify(
    secret: &str,
    gateway_order_id: &str,
    gateway_payment_id: &str,
    provided_hex: &str,
) -> bool {
    let Some(mac) = mac_for(secret, gateway_order_id, gateway_payment_id) else {
        return false;
    };
    let Ok(provided) = hex::decode(provided_hex) else {
        return false;
    };
    mac.verify_slice(&provided).is_ok()
}
