//! Payment method availability route handler.

use axum::{Json, extract::Query};
use serde::Deserialize;
use tracing::instrument;

use meridian_checkout::available_payment_methods;
use meridian_core::{AccountType, PaymentMethodRef, Platform};

use super::CurrentUser;

/// Query parameters for payment method availability.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub platform: Platform,
    #[serde(default)]
    pub account_type: AccountType,
}

/// `GET /api/payment-methods` - Payment methods available for the caller's
/// platform and account type.
///
/// Wallets are platform-gated (Apple Pay on iOS, Google Pay on Android)
/// and bank transfer is restricted to business accounts.
#[instrument]
pub async fn index(
    CurrentUser(_user_id): CurrentUser,
    Query(query): Query<AvailabilityQuery>,
) -> Json<Vec<PaymentMethodRef>> {
    Json(available_payment_methods(query.account_type, query.platform))
}
