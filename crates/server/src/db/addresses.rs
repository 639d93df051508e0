//! Address repository for database operations.

use sqlx::{PgPool, Row};

use meridian_core::{Address, AddressId, UserId};

use super::RepositoryError;

/// Address ownership checks as the order service needs them. A trait seam
/// so the service is testable without a database.
pub trait AddressDirectory {
    /// Whether the address belongs to the given user.
    fn belongs_to(
        &self,
        address_id: AddressId,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;
}

impl<T: AddressDirectory + Sync> AddressDirectory for &T {
    fn belongs_to(
        &self,
        address_id: AddressId,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send {
        (**self).belongs_to(address_id, user_id)
    }
}

/// Repository for address database operations.
pub struct AddressRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AddressRepository<'a> {
    /// Create a new address repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's saved addresses, default-flagged rows first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT id, street, city, postal_code, country,
                   is_default_delivery, is_default_billing
            FROM meridian.addresses
            WHERE user_id = $1
            ORDER BY is_default_delivery DESC, is_default_billing DESC, id
            ",
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(Address {
                    id: AddressId::new(row.try_get("id")?),
                    street: row.try_get("street")?,
                    city: row.try_get("city")?,
                    postal_code: row.try_get("postal_code")?,
                    country: row.try_get("country")?,
                    is_default_delivery: row.try_get("is_default_delivery")?,
                    is_default_billing: row.try_get("is_default_billing")?,
                })
            })
            .collect()
    }
}

impl AddressDirectory for AddressRepository<'_> {
    /// Order creation refuses address ids a user does not own.
    async fn belongs_to(
        &self,
        address_id: AddressId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let row = sqlx::query("SELECT 1 AS one FROM meridian.addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id.as_i32())
            .bind(user_id.as_i32())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.is_some())
    }
}
