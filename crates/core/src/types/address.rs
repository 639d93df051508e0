//! Delivery and billing addresses.

use serde::{Deserialize, Serialize};

use super::id::AddressId;

/// A saved address from the user's address book.
///
/// Addresses are owned by the address-book store; checkout only references
/// them by value and never mutates them. At most one address per user
/// carries each default flag (enforced by the address store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    pub is_default_delivery: bool,
    pub is_default_billing: bool,
}

impl Address {
    /// Single-line display form for logs and summaries.
    #[must_use]
    pub fn display_line(&self) -> String {
        format!(
            "{}, {} {}, {}",
            self.street, self.postal_code, self.city, self.country
        )
    }
}
