//! Guest session registration and guest-to-user data migration.

use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use meridian_core::{GuestId, UserId};

use crate::db::guests::MigrationCounts;
use crate::db::{GuestRepository, RepositoryError};

/// Errors from guest session operations.
#[derive(Debug, Error)]
pub enum GuestServiceError {
    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The guest id does not carry the expected `guest_` prefix.
    #[error("malformed guest id")]
    MalformedGuestId,

    /// The guest session is not registered.
    #[error("unknown guest session")]
    UnknownSession,
}

/// Service for guest session operations.
pub struct GuestService<'a> {
    guests: GuestRepository<'a>,
}

impl<'a> GuestService<'a> {
    /// Create a new guest service.
    #[must_use]
    pub const fn new(pool: &'a sqlx::PgPool) -> Self {
        Self {
            guests: GuestRepository::new(pool),
        }
    }

    /// Register a client-minted guest session id. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `GuestServiceError::MalformedGuestId` for ids without the
    /// `guest_` prefix.
    #[instrument(skip(self), fields(guest_id = %guest_id))]
    pub async fn register(&self, guest_id: &GuestId) -> Result<(), GuestServiceError> {
        if !guest_id.is_well_formed() {
            return Err(GuestServiceError::MalformedGuestId);
        }
        self.guests.register(guest_id).await?;
        tracing::debug!("guest session registered");
        Ok(())
    }

    /// Move a guest's cart and favorites to a registered user.
    ///
    /// Idempotent per `migration_token`: replaying a token returns the
    /// originally recorded counts without moving anything twice.
    ///
    /// # Errors
    ///
    /// Returns `GuestServiceError::UnknownSession` if the guest session
    /// was never registered.
    #[instrument(skip(self), fields(guest_id = %guest_id, user_id = user_id.as_i32()))]
    pub async fn migrate_to_user(
        &self,
        guest_id: &GuestId,
        user_id: UserId,
        migration_token: Uuid,
    ) -> Result<MigrationCounts, GuestServiceError> {
        if !guest_id.is_well_formed() {
            return Err(GuestServiceError::MalformedGuestId);
        }

        let counts = self
            .guests
            .migrate_to_user(guest_id, user_id, migration_token)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => GuestServiceError::UnknownSession,
                other => GuestServiceError::Repository(other),
            })?;

        tracing::info!(
            cart_items = counts.cart_items,
            favorites = counts.favorites,
            "guest data migrated"
        );
        Ok(counts)
    }
}
