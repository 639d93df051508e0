//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::payments::ProviderError;

/// Application-level error type for the server.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Payment provider API operation failed.
    #[error("Payment provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request conflicts with existing state.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Caller identity missing or invalid.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<crate::services::OrderError> for AppError {
    fn from(err: crate::services::OrderError) -> Self {
        use crate::services::OrderError;
        match err {
            OrderError::Repository(e) => Self::Database(e),
            OrderError::EmptyCart => Self::BadRequest("order has no line items".to_string()),
            OrderError::AddressNotOwned(id) => {
                Self::BadRequest(format!("address {id} does not belong to you"))
            }
            OrderError::UnknownPaymentMethod(id) => {
                Self::BadRequest(format!("unknown payment method: {id}"))
            }
            OrderError::NotFound => Self::NotFound("order".to_string()),
            OrderError::Reconciliation { source, .. } => Self::Provider(source),
            OrderError::IntentConflict(msg) => Self::Conflict(msg),
        }
    }
}

impl From<crate::services::GuestServiceError> for AppError {
    fn from(err: crate::services::GuestServiceError) -> Self {
        use crate::services::GuestServiceError;
        match err {
            GuestServiceError::Repository(e) => Self::Database(e),
            GuestServiceError::MalformedGuestId => {
                Self::BadRequest("malformed guest id".to_string())
            }
            GuestServiceError::UnknownSession => Self::NotFound("guest session".to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Provider(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Provider(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) => "Internal server error".to_string(),
            Self::Provider(_) => "Payment service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}
