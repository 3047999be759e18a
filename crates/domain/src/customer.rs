use common::UserId;
use serde::{Deserialize, Serialize};

/// Contact details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Who placed the order.
///
/// A guest order carries its own contact details and may later be
/// promoted to a registered account; a registered order is linked to an
/// existing user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Customer {
    Registered { user_id: UserId, contact: ContactInfo },
    Guest { guest_id: UserId, contact: ContactInfo },
}

impl Customer {
    pub fn is_guest(&self) -> bool {
        matches!(self, Customer::Guest { .. })
    }

    /// The account the order is linked to, guest or registered.
    pub fn user_id(&self) -> UserId {
        match self {
            Customer::Registered { user_id, .. } => *user_id,
            Customer::Guest { guest_id, .. } => *guest_id,
        }
    }

    pub fn contact(&self) -> &ContactInfo {
        match self {
            Customer::Registered { contact, .. } | Customer::Guest { contact, .. } => contact,
        }
    }

    pub fn contact_email(&self) -> &str {
        &self.contact().email
    }

    pub fn display_name(&self) -> &str {
        &self.contact().name
    }
}
