//! Address route handlers.

use axum::{Json, extract::State};
use tracing::instrument;

use meridian_core::Address;

use crate::db::AddressRepository;
use crate::error::AppError;
use crate::state::AppState;

use super::CurrentUser;

/// `GET /api/addresses` - List the caller's saved addresses.
///
/// Default-flagged addresses come first, matching the order the checkout
/// defaulting policy expects.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Address>>, AppError> {
    let addresses = AddressRepository::new(state.pool())
        .list_for_user(user_id)
        .await?;
    Ok(Json(addresses))
}
