//! Typed errors for the I/O-touching checkout components.
//!
//! The reducer and the defaulting policy are total functions and have no
//! error types of their own. Everything that crosses a boundary surfaces a
//! typed error to its caller instead of logging and swallowing.

use thiserror::Error;

use crate::boundary::BoundaryError;

/// The checkout field that failed precondition validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationField {
    DeliveryAddress,
    PaymentMethod,
    AgreedToTerms,
}

impl ValidationField {
    /// The field name as surfaced to the user.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::DeliveryAddress => "delivery_address",
            Self::PaymentMethod => "payment_method",
            Self::AgreedToTerms => "agreed_to_terms",
        }
    }
}

impl std::fmt::Display for ValidationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A precondition failed before any network call was made.
///
/// Never retried automatically; the offending field is named verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing or unset checkout field: {field}")]
pub struct ValidationError {
    pub field: ValidationField,
}

impl ValidationError {
    #[must_use]
    pub const fn new(field: ValidationField) -> Self {
        Self { field }
    }
}

/// Order submission failed.
///
/// Submission is never retried automatically: retrying a non-idempotent
/// creation call risks duplicate orders, so the caller must surface the
/// error and require explicit re-submission.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// A local precondition failed; no network call was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The order-creation boundary rejected or failed the call.
    #[error("order submission failed: {0}")]
    Boundary(#[from] BoundaryError),
}

/// Guest session creation or guest-to-user migration failed.
#[derive(Debug, Error)]
pub enum GuestError {
    /// The server did not acknowledge the guest session; the caller stays
    /// in its pre-existing state rather than adopting an unregistered id.
    #[error("guest session registration failed: {0}")]
    Registration(#[source] BoundaryError),

    /// The server-side transfer failed; the guest session and its data
    /// remain intact and the transfer may be retried as a whole.
    #[error("guest data transfer failed: {0}")]
    Transfer(#[source] BoundaryError),

    /// Local persistence of the guest session failed.
    #[error("guest session store failed: {0}")]
    Store(String),

    /// No guest session exists to migrate.
    #[error("no active guest session")]
    NoActiveSession,
}
