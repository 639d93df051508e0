//! Guest session route handlers.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use meridian_core::GuestId;

use crate::error::AppError;
use crate::services::GuestService;
use crate::state::AppState;

use super::CurrentUser;

/// Request body for guest session registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSessionRequest {
    pub guest_id: GuestId,
}

/// Request body for guest-to-user migration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateRequest {
    pub guest_id: GuestId,
    /// Client-minted idempotency token; replaying it returns the original
    /// counts without moving anything twice.
    pub migration_token: Uuid,
}

/// Response body reporting what a migration moved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrateResponse {
    pub migrated_cart_items: u32,
    pub migrated_favorites: u32,
}

/// `POST /api/guest/session` - Register a client-minted guest id.
///
/// Idempotent: re-registering the same id succeeds.
#[instrument(skip(state, body))]
pub async fn register_session(
    State(state): State<AppState>,
    Json(body): Json<RegisterSessionRequest>,
) -> Result<StatusCode, AppError> {
    GuestService::new(state.pool()).register(&body.guest_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/auth/migrate-guest-data` - Move a guest's cart and favorites
/// to the authenticated user, then delete the guest session.
#[instrument(skip(state, body))]
pub async fn migrate(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(body): Json<MigrateRequest>,
) -> Result<Json<MigrateResponse>, AppError> {
    let counts = GuestService::new(state.pool())
        .migrate_to_user(&body.guest_id, user_id, body.migration_token)
        .await?;
    Ok(Json(MigrateResponse {
        migrated_cart_items: counts.cart_items,
        migrated_favorites: counts.favorites,
    }))
}
