//! Temporary credentials for guest account promotion.

use hex::encode as hex_encode;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Derives a six-character temporary password from the guest's email.
///
/// The local part is stripped to alphanumerics, padded with `x` to five
/// characters, and suffixed with a random digit before truncation. The
/// result is emailed to the guest and must be changed on first login.
pub(crate) fn temp_password(email: &str) -> String {
    let local = email.split('@').next().unwrap_or("");
    let mut base: String = local
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(5)
        .collect();
    while base.len() < 5 {
        base.push('x');
    }
    let digit = rand::rng().random_range(1..=10u32);
    let mut password = format!("{base}{digit}");
    password.truncate(6);
    password
}

/// Salted SHA-256 digest in `salt$digest` form.
pub(crate) fn digest_password(password: &str) -> String {
    let salt: [u8; 16] = rand::rng().random();
    let salt_hex = hex_encode(salt);
    let mut hasher = Sha256::new();
    hasher.update(salt_hex.as_bytes());
    hasher.update(password.as_bytes());
    format!("{salt_hex}${}", hex_encode(hasher.finalize()))
}
