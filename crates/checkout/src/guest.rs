//! Guest identity creation and migration to an authenticated identity.
//!
//! The guest session must never be adopted locally before the server has
//! acknowledged it, and must never be cleared locally before the server has
//! confirmed the data transfer. A failed transfer leaves the session fully
//! intact; only the local cleanup step is retryable on its own.

use uuid::Uuid;

use meridian_core::GuestId;

use crate::boundary::{IdentityBoundary, MigrationReport};
use crate::error::GuestError;

/// Local persistence of the guest session id (e.g. device keychain or a
/// browser store). Synchronous by design; implementations that need I/O
/// buffer it internally.
pub trait GuestSessionStore {
    /// The currently persisted guest id, if any.
    fn load(&self) -> Option<GuestId>;

    /// Persist the guest id.
    ///
    /// # Errors
    ///
    /// Returns a storage-specific message when persistence fails.
    fn store(&self, guest_id: &GuestId) -> Result<(), String>;

    /// Remove the persisted guest id.
    ///
    /// # Errors
    ///
    /// Returns a storage-specific message when removal fails.
    fn clear(&self) -> Result<(), String>;
}

impl<T: GuestSessionStore> GuestSessionStore for &T {
    fn load(&self) -> Option<GuestId> {
        (**self).load()
    }

    fn store(&self, guest_id: &GuestId) -> Result<(), String> {
        (**self).store(guest_id)
    }

    fn clear(&self) -> Result<(), String> {
        (**self).clear()
    }
}

/// The result of a successful migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub report: MigrationReport,
    /// True when the server-side transfer succeeded but local cleanup
    /// failed; retry [`GuestIdentityMigrator::finish_migration`] only.
    pub cleanup_pending: bool,
}

/// Converts an anonymous session into an authenticated one.
///
/// Dependencies are constructor-injected so the migrator is testable with
/// in-memory fakes.
pub struct GuestIdentityMigrator<S, B> {
    store: S,
    boundary: B,
}

impl<S, B> GuestIdentityMigrator<S, B>
where
    S: GuestSessionStore,
    B: IdentityBoundary,
{
    pub const fn new(store: S, boundary: B) -> Self {
        Self { store, boundary }
    }

    /// The currently adopted guest id, if any.
    pub fn current_guest(&self) -> Option<GuestId> {
        self.store.load()
    }

    /// Generate a guest id, register it with the server, and persist it
    /// locally.
    ///
    /// # Errors
    ///
    /// Returns `GuestError::Registration` when the server rejects or is
    /// unreachable; the caller stays in its pre-existing state. Operating
    /// as "guest" without a server-acknowledged session would orphan carts
    /// and orders created against the unregistered id.
    pub async fn create_guest_session(&self) -> Result<GuestId, GuestError> {
        let guest_id = GuestId::generate();

        self.boundary
            .create_guest_session(&guest_id)
            .await
            .map_err(GuestError::Registration)?;

        self.store.store(&guest_id).map_err(GuestError::Store)?;

        tracing::info!(guest_id = %guest_id, "guest session created");
        Ok(guest_id)
    }

    /// Transfer guest-owned resources to the authenticated identity, then
    /// clear the local guest session.
    ///
    /// The transfer carries a fresh migration token so a server-side retry
    /// cannot double-credit guest data. The local session is cleared only
    /// after the server confirms success; if the transfer fails, the guest
    /// session and its data remain intact.
    ///
    /// # Errors
    ///
    /// Returns `GuestError::NoActiveSession` when there is nothing to
    /// migrate and `GuestError::Transfer` when the server-side transfer
    /// fails.
    pub async fn migrate_to_user(&self, phone_number: &str) -> Result<MigrationOutcome, GuestError> {
        let guest_id = self.store.load().ok_or(GuestError::NoActiveSession)?;
        let migration_token = Uuid::new_v4();

        let report = self
            .boundary
            .migrate_guest_data(phone_number, &guest_id, migration_token)
            .await
            .map_err(GuestError::Transfer)?;

        // Server has durably confirmed the transfer; the local id is now
        // the only remaining reference to the guest session.
        let cleanup_pending = match self.store.clear() {
            Ok(()) => false,
            Err(err) => {
                tracing::warn!(guest_id = %guest_id, error = %err, "guest cleanup failed after confirmed transfer");
                true
            }
        };

        tracing::info!(
            guest_id = %guest_id,
            cart_items = report.cart_items,
            favorites = report.favorites,
            "guest data migrated"
        );

        Ok(MigrationOutcome {
            report,
            cleanup_pending,
        })
    }

    /// Retry the local cleanup step alone, after a migration whose
    /// server-side transfer already succeeded. Idempotent: a cleared
    /// session is a success.
    ///
    /// # Errors
    ///
    /// Returns `GuestError::Store` when the store still cannot clear.
    pub fn finish_migration(&self) -> Result<(), GuestError> {
        if self.store.load().is_some() {
            self.store.clear().map_err(GuestError::Store)?;
        }
        Ok(())
    }
}
