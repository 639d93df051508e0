//! Database operations for the `meridian` `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `meridian.orders` - Orders with payment reconciliation columns
//! - `meridian.order_lines` - Line items per order
//! - `meridian.cart_items` - Cart rows keyed by owner (user id or guest id)
//! - `meridian.favorites` - Favorite products keyed by owner
//! - `meridian.guest_sessions` - Registered guest identifiers
//! - `meridian.guest_migrations` - Completed migrations keyed by idempotency token
//! - `meridian.addresses` - User delivery/billing addresses
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via
//! `sqlx migrate run` against the configured database.

pub mod addresses;
pub mod guests;
pub mod orders;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use addresses::{AddressDirectory, AddressRepository};
pub use guests::GuestRepository;
pub use orders::{OrderRepository, OrderStore};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., conflicting payment intent).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
