//! Server boundaries consumed by the checkout flow.
//!
//! Implementations live outside this crate (HTTP clients in production,
//! in-memory fakes in tests). Traits take `&self`; implementations are
//! expected to manage their own interior state.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use meridian_core::{Address, GuestId, Order, OrderDraft, UserId};

/// Failure at a server boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    /// The server could not be reached or the call timed out.
    #[error("boundary unreachable: {0}")]
    Unreachable(String),

    /// The server reached a decision and said no.
    #[error("rejected: {0}")]
    Rejected(String),
}

/// Read access to the user's saved address book.
pub trait AddressStore {
    /// List the user's saved addresses. Order is unspecified; the
    /// defaulting policy tolerates any order.
    fn list_addresses(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<Address>, BoundaryError>> + Send;
}

/// What the server reports after a successful guest-data transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub cart_items: u32,
    pub favorites: u32,
}

/// Guest session registration and guest-to-user data transfer.
pub trait IdentityBoundary {
    /// Register a client-generated guest id with the server.
    fn create_guest_session(
        &self,
        guest_id: &GuestId,
    ) -> impl Future<Output = Result<(), BoundaryError>> + Send;

    /// Transfer guest-owned resources to the authenticated identity.
    ///
    /// `migration_token` makes the transfer idempotent server-side: a retry
    /// carrying the same token must not double-credit guest data.
    fn migrate_guest_data(
        &self,
        phone_number: &str,
        guest_id: &GuestId,
        migration_token: Uuid,
    ) -> impl Future<Output = Result<MigrationReport, BoundaryError>> + Send;
}

/// The result of a successful order creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order: Order,
    /// Present when the payment method requires client-side confirmation
    /// against the provider.
    pub provider_client_secret: Option<String>,
}

/// The server-side order-creation operation.
pub trait OrderBoundary {
    /// Create an order from a finalized draft. Not idempotent; callers must
    /// not retry automatically.
    fn create_order(
        &self,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<OrderConfirmation, BoundaryError>> + Send;
}

// Boundaries are used through shared references in services and tests.

impl<T: AddressStore + Sync> AddressStore for &T {
    fn list_addresses(
        &self,
        user: UserId,
    ) -> impl Future<Output = Result<Vec<Address>, BoundaryError>> + Send {
        (**self).list_addresses(user)
    }
}

impl<T: IdentityBoundary + Sync> IdentityBoundary for &T {
    fn create_guest_session(
        &self,
        guest_id: &GuestId,
    ) -> impl Future<Output = Result<(), BoundaryError>> + Send {
        (**self).create_guest_session(guest_id)
    }

    fn migrate_guest_data(
        &self,
        phone_number: &str,
        guest_id: &GuestId,
        migration_token: Uuid,
    ) -> impl Future<Output = Result<MigrationReport, BoundaryError>> + Send {
        (**self).migrate_guest_data(phone_number, guest_id, migration_token)
    }
}

impl<T: OrderBoundary + Sync> OrderBoundary for &T {
    fn create_order(
        &self,
        draft: &OrderDraft,
    ) -> impl Future<Output = Result<OrderConfirmation, BoundaryError>> + Send {
        (**self).create_order(draft)
    }
}
