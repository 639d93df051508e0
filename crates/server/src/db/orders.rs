//! Order repository for database operations.
//!
//! Orders are inserted together with their line items in one transaction.
//! Payment intent attachment is a separate, idempotency-guarded update so
//! that a provider failure after insert leaves a committed pending order
//! that can be reconciled later.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use meridian_core::{
    AddressId, CartLine, Order, OrderDraft, OrderId, OrderStatus, PaymentStatus, ProductId, UserId,
    amount_in_minor_units,
};

use super::RepositoryError;

/// Order storage as the order service drives it.
///
/// A trait seam so the service's creation and reconciliation flows can be
/// exercised against in-memory stores, the same way the checkout crate
/// tests against boundary fakes.
pub trait OrderStore {
    /// Insert a new pending order and its line items in one transaction.
    fn create(
        &self,
        user_id: UserId,
        order_number: &str,
        draft: &OrderDraft,
        currency: &str,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send;

    /// Fetch one of the user's orders. Scoped by `user_id`; another
    /// caller's order id reads as absent.
    fn get(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send;

    /// Attach payment intent details to exactly one order row.
    ///
    /// Idempotency contract:
    /// - fresh attachment sets the intent id, client secret, and bumps
    ///   `updated_at`
    /// - re-attaching the *same* intent id succeeds as a no-op (safe to
    ///   retry after a timeout)
    /// - attaching a *different* intent id is rejected with
    ///   `RepositoryError::Conflict` so a reconciled order is never
    ///   silently re-pointed at another intent
    fn attach_payment_info(
        &self,
        order_id: OrderId,
        intent_id: &str,
        client_secret: Option<&str>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Total amount of an order's lines in minor currency units, for the
    /// provider call.
    fn amount_minor(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<i64, RepositoryError>> + Send;
}

impl<T: OrderStore + Sync> OrderStore for &T {
    fn create(
        &self,
        user_id: UserId,
        order_number: &str,
        draft: &OrderDraft,
        currency: &str,
    ) -> impl Future<Output = Result<Order, RepositoryError>> + Send {
        (**self).create(user_id, order_number, draft, currency)
    }

    fn get(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> impl Future<Output = Result<Option<Order>, RepositoryError>> + Send {
        (**self).get(order_id, user_id)
    }

    fn attach_payment_info(
        &self,
        order_id: OrderId,
        intent_id: &str,
        client_secret: Option<&str>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        (**self).attach_payment_info(order_id, intent_id, client_secret)
    }

    fn amount_minor(
        &self,
        order_id: OrderId,
    ) -> impl Future<Output = Result<i64, RepositoryError>> + Send {
        (**self).amount_minor(order_id)
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the line items for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_lines(&self, order_id: OrderId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query(
            r"
            SELECT product_id, quantity, unit_price
            FROM meridian.order_lines
            WHERE order_id = $1
            ORDER BY product_id
            ",
        )
        .bind(order_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let quantity: i32 = row.try_get("quantity")?;
                Ok(CartLine {
                    product_id: ProductId::new(row.try_get("product_id")?),
                    quantity: u32::try_from(quantity).map_err(|_| {
                        RepositoryError::DataCorruption(format!(
                            "negative quantity {quantity} in order line"
                        ))
                    })?,
                    unit_price: row.try_get("unit_price")?,
                })
            })
            .collect()
    }
}

impl OrderStore for OrderRepository<'_> {
    /// The order commits before any payment provider call is made, so a
    /// provider outage never loses the order.
    async fn create(
        &self,
        user_id: UserId,
        order_number: &str,
        draft: &OrderDraft,
        currency: &str,
    ) -> Result<Order, RepositoryError> {
        let id = OrderId::generate();
        let billing_address_id = draft
            .billing_address_id
            .unwrap_or(draft.shipping_address_id);
        let total: Decimal = draft.lines.iter().map(CartLine::total).sum();

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r"
            INSERT INTO meridian.orders
                (id, user_id, order_number, status, payment_status,
                 shipping_address_id, billing_address_id, payment_method_id,
                 total_amount, currency, notes)
            VALUES ($1, $2, $3, 'pending', 'pending', $4, $5, $6, $7, $8, $9)
            RETURNING created_at, updated_at
            ",
        )
        .bind(id.as_uuid())
        .bind(user_id.as_i32())
        .bind(order_number)
        .bind(draft.shipping_address_id.as_i32())
        .bind(billing_address_id.as_i32())
        .bind(&draft.payment_method_id)
        .bind(total)
        .bind(currency)
        .bind(draft.notes.as_deref())
        .fetch_one(&mut *tx)
        .await?;

        for line in &draft.lines {
            sqlx::query(
                r"
                INSERT INTO meridian.order_lines (order_id, product_id, quantity, unit_price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(id.as_uuid())
            .bind(line.product_id.as_i32())
            .bind(i32::try_from(line.quantity).unwrap_or(i32::MAX))
            .bind(line.unit_price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id,
            order_number: order_number.to_string(),
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            shipping_address_id: draft.shipping_address_id,
            billing_address_id,
            payment_method_id: draft.payment_method_id.clone(),
            total_amount: total,
            currency: currency.to_string(),
            provider_payment_intent_id: None,
            provider_client_secret: None,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    async fn get(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query(
            r"
            SELECT id, order_number, status, payment_status,
                   shipping_address_id, billing_address_id, payment_method_id,
                   total_amount, currency,
                   provider_payment_intent_id, provider_client_secret,
                   created_at, updated_at
            FROM meridian.orders
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(order_id.as_uuid())
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(order_from_row).transpose()
    }

    async fn attach_payment_info(
        &self,
        order_id: OrderId,
        intent_id: &str,
        client_secret: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE meridian.orders
            SET provider_payment_intent_id = $2,
                provider_client_secret = $3,
                updated_at = now()
            WHERE id = $1
              AND (provider_payment_intent_id IS NULL
                   OR provider_payment_intent_id = $2)
            ",
        )
        .bind(order_id.as_uuid())
        .bind(intent_id)
        .bind(client_secret)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        // Zero rows: either the order is missing or it already carries a
        // different intent id. Distinguish for the caller.
        let existing: Option<Option<String>> =
            sqlx::query_scalar("SELECT provider_payment_intent_id FROM meridian.orders WHERE id = $1")
                .bind(order_id.as_uuid())
                .fetch_optional(self.pool)
                .await?;

        match existing {
            None => Err(RepositoryError::NotFound),
            Some(attached) => Err(RepositoryError::Conflict(format!(
                "order {order_id} already has payment intent {}",
                attached.as_deref().unwrap_or("<none>")
            ))),
        }
    }

    async fn amount_minor(&self, order_id: OrderId) -> Result<i64, RepositoryError> {
        let lines = self.get_lines(order_id).await?;
        Ok(amount_in_minor_units(&lines))
    }
}

fn order_from_row(row: sqlx::postgres::PgRow) -> Result<Order, RepositoryError> {
    let id: Uuid = row.try_get("id")?;
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at")?;

    Ok(Order {
        id: OrderId::new(id),
        order_number: row.try_get("order_number")?,
        status: status.parse().map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid order status: {status}"))
        })?,
        payment_status: payment_status.parse().map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid payment status: {payment_status}"))
        })?,
        shipping_address_id: AddressId::new(row.try_get("shipping_address_id")?),
        billing_address_id: AddressId::new(row.try_get("billing_address_id")?),
        payment_method_id: row.try_get("payment_method_id")?,
        total_amount: row.try_get("total_amount")?,
        currency: row.try_get("currency")?,
        provider_payment_intent_id: row.try_get("provider_payment_intent_id")?,
        provider_client_secret: row.try_get("provider_client_secret")?,
        created_at,
        updated_at,
    })
}
