//! Guest session and guest-to-user migration repository.
//!
//! Cart and favorite rows are keyed by an `owner` column holding either a
//! registered user id (as text) or a `guest_` identifier, so migration is
//! a matter of re-keying rows inside one transaction.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use meridian_core::{GuestId, UserId};

use super::RepositoryError;

/// Counts of rows moved by a guest-to-user migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationCounts {
    pub cart_items: u32,
    pub favorites: u32,
}

/// Repository for guest session database operations.
pub struct GuestRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> GuestRepository<'a> {
    /// Create a new guest repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a guest session id.
    ///
    /// Registering the same id again is a no-op, so a client retrying
    /// after a timeout does not fail.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn register(&self, guest_id: &GuestId) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO meridian.guest_sessions (guest_id)
            VALUES ($1)
            ON CONFLICT (guest_id) DO NOTHING
            ",
        )
        .bind(guest_id.as_str())
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Move a guest's cart and favorites to a registered user, then delete
    /// the guest rows. Runs in one transaction.
    ///
    /// Cart rows overwrite the user's quantity on conflict (the guest cart
    /// is the fresher one); favorites insert with conflict-do-nothing.
    ///
    /// The `migration_token` makes the whole operation idempotent: a token
    /// that was already processed returns the originally recorded counts
    /// without touching any data again.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the guest session is not
    /// registered, `RepositoryError::Database` on query failure.
    pub async fn migrate_to_user(
        &self,
        guest_id: &GuestId,
        user_id: UserId,
        migration_token: Uuid,
    ) -> Result<MigrationCounts, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Replayed token: return the recorded outcome, touch nothing.
        let prior = sqlx::query(
            r"
            SELECT migrated_cart_items, migrated_favorites
            FROM meridian.guest_migrations
            WHERE token = $1
            ",
        )
        .bind(migration_token)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(row) = prior {
            let cart_items: i32 = row.try_get("migrated_cart_items")?;
            let favorites: i32 = row.try_get("migrated_favorites")?;
            tx.commit().await?;
            return Ok(MigrationCounts {
                cart_items: u32::try_from(cart_items).unwrap_or(0),
                favorites: u32::try_from(favorites).unwrap_or(0),
            });
        }

        let session = sqlx::query("SELECT 1 AS one FROM meridian.guest_sessions WHERE guest_id = $1")
            .bind(guest_id.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if session.is_none() {
            return Err(RepositoryError::NotFound);
        }

        let owner = user_id.as_i32().to_string();

        let cart_moved = sqlx::query(
            r"
            INSERT INTO meridian.cart_items (owner, product_id, quantity)
            SELECT $2, product_id, quantity
            FROM meridian.cart_items
            WHERE owner = $1
            ON CONFLICT (owner, product_id)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = now()
            ",
        )
        .bind(guest_id.as_str())
        .bind(&owner)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let favorites_moved = sqlx::query(
            r"
            INSERT INTO meridian.favorites (owner, product_id)
            SELECT $2, product_id
            FROM meridian.favorites
            WHERE owner = $1
            ON CONFLICT (owner, product_id) DO NOTHING
            ",
        )
        .bind(guest_id.as_str())
        .bind(&owner)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM meridian.cart_items WHERE owner = $1")
            .bind(guest_id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM meridian.favorites WHERE owner = $1")
            .bind(guest_id.as_str())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM meridian.guest_sessions WHERE guest_id = $1")
            .bind(guest_id.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r"
            INSERT INTO meridian.guest_migrations
                (token, guest_id, user_id, migrated_cart_items, migrated_favorites)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(migration_token)
        .bind(guest_id.as_str())
        .bind(user_id.as_i32())
        .bind(i32::try_from(cart_moved).unwrap_or(i32::MAX))
        .bind(i32::try_from(favorites_moved).unwrap_or(i32::MAX))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(MigrationCounts {
            cart_items: u32::try_from(cart_moved).unwrap_or(0),
            favorites: u32::try_from(favorites_moved).unwrap_or(0),
        })
    }
}
