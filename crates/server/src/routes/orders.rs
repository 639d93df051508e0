//! Order route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use meridian_core::{Order, OrderDraft, OrderId};

use crate::db::{AddressRepository, OrderRepository, OrderStore};
use crate::error::AppError;
use crate::payments::ProviderClient;
use crate::services::{CreatedOrder, OrderError, OrderService};
use crate::state::AppState;

use super::CurrentUser;

/// Response body for created and fetched orders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

impl From<CreatedOrder> for OrderResponse {
    fn from(created: CreatedOrder) -> Self {
        Self {
            order: created.order,
            client_secret: created.client_secret,
        }
    }
}

/// `POST /api/orders` - Create an order from a finalized checkout draft.
///
/// The order row commits before the payment provider is called. When the
/// provider call fails, the response is `502` and names the already
/// created order so the client retries attachment instead of re-ordering.
#[instrument(skip(state, draft))]
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(draft): Json<OrderDraft>,
) -> Result<Response, AppError> {
    let service = order_service(&state);

    match service.create(user_id, &draft).await {
        Ok(created) => Ok((StatusCode::CREATED, Json(OrderResponse::from(created))).into_response()),
        Err(OrderError::Reconciliation { order_id, source }) => {
            // The order exists; only the payment setup is missing.
            tracing::warn!(%order_id, error = %source, "order created without payment intent");
            Ok((
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": "payment_setup_failed",
                    "orderId": order_id,
                })),
            )
                .into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// `GET /api/orders/{id}` - Fetch an order. Another user's order id reads
/// as absent.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(OrderId::new(id), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("order".to_string()))?;
    let client_secret = order.provider_client_secret.clone();
    Ok(Json(OrderResponse {
        order,
        client_secret,
    }))
}

/// `POST /api/orders/{id}/payment` - Retry payment intent attachment for an
/// order left unpaid by an earlier provider failure.
#[instrument(skip(state))]
pub async fn retry_payment(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let service = order_service(&state);
    let created = service
        .retry_payment_attachment(user_id, OrderId::new(id))
        .await?;
    Ok(Json(OrderResponse::from(created)))
}

fn order_service(
    state: &AppState,
) -> OrderService<'_, OrderRepository<'_>, AddressRepository<'_>, &ProviderClient> {
    OrderService::new(
        OrderRepository::new(state.pool()),
        AddressRepository::new(state.pool()),
        state.payments(),
        &state.config().currency,
    )
}
