use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

/// A login account. Guest orders get one of these when the guest is
/// promoted after a verified payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    /// Salted digest of the password; never the plaintext.
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}
