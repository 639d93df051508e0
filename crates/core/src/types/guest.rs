//! Guest session identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix applied to all generated guest identifiers.
const GUEST_ID_PREFIX: &str = "guest_";

/// An opaque, client-generated identifier for an anonymous session.
///
/// A `GuestId` is minted on the client before the server has seen it; the
/// server-registered session keyed by this id owns the guest's cart and
/// favorites until migration to an authenticated identity succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Mint a fresh guest identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("{GUEST_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Wrap an existing identifier (e.g. read back from local storage).
    #[must_use]
    pub fn from_string(id: String) -> Self {
        Self(id)
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier carries the `guest_` prefix every generated
    /// id has. Server endpoints reject ids without it.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.len() > GUEST_ID_PREFIX.len() && self.0.starts_with(GUEST_ID_PREFIX)
    }
}

impl std::fmt::Display for GuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
