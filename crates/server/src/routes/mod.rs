//! HTTP route handlers for the order and checkout API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (verifies database)
//!
//! # Orders
//! POST /api/orders                   - Create an order from a checkout draft
//! GET  /api/orders/{id}              - Fetch an order
//! POST /api/orders/{id}/payment      - Retry payment intent attachment
//!
//! # Guest sessions
//! POST /api/guest/session            - Register a client-minted guest id
//! POST /api/auth/migrate-guest-data  - Move guest cart/favorites to a user
//!
//! # Checkout support
//! GET  /api/addresses                - List the caller's saved addresses
//! GET  /api/payment-methods          - Available methods for platform/account
//! ```
//!
//! Caller identity arrives in the `x-meridian-user-id` header, set by the
//! authenticating gateway in front of this service.

pub mod addresses;
pub mod guest;
pub mod orders;
pub mod payment_methods;

use axum::{
    Router,
    extract::FromRequestParts,
    http::request::Parts,
    routing::{get, post},
};

use meridian_core::UserId;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the authenticated user id.
pub const USER_ID_HEADER: &str = "x-meridian-user-id";

/// The authenticated caller, extracted from the gateway-set identity header.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub UserId);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i32>().ok())
            .ok_or_else(|| AppError::Unauthorized("missing user identity".to_string()))?;
        Ok(Self(UserId::new(id)))
    }
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/payment", post(orders::retry_payment))
}

/// Create the guest session routes router.
pub fn guest_routes() -> Router<AppState> {
    Router::new().route("/session", post(guest::register_session))
}

/// Create the combined API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/orders", order_routes())
        .nest("/api/guest", guest_routes())
        .route("/api/auth/migrate-guest-data", post(guest::migrate))
        .route("/api/addresses", get(addresses::index))
        .route("/api/payment-methods", get(payment_methods::index))
}
