//! Payment provider API client.
//!
//! Talks to a Stripe-compatible payment intents API over `reqwest`. The
//! secret key never leaves this module; handlers only ever see the intent
//! id and the client secret destined for the mobile/web client.

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use meridian_core::OrderId;

use crate::config::ProviderConfig;

/// Errors from the payment provider API.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or transport failure.
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("provider rejected request: HTTP {status}: {message}")]
    Api { status: u16, message: String },
}

/// A created payment intent, as needed for reconciliation.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: Option<String>,
}

/// Server-side payment intent creation.
///
/// Abstracted as a trait so order services are testable without network
/// access.
pub trait PaymentProvider {
    /// Create a payment intent for an order.
    fn create_intent(
        &self,
        order_id: OrderId,
        amount_minor: i64,
        currency: &str,
    ) -> impl Future<Output = Result<PaymentIntent, ProviderError>> + Send;
}

impl<T: PaymentProvider + Sync> PaymentProvider for &T {
    fn create_intent(
        &self,
        order_id: OrderId,
        amount_minor: i64,
        currency: &str,
    ) -> impl Future<Output = Result<PaymentIntent, ProviderError>> + Send {
        (**self).create_intent(order_id, amount_minor, currency)
    }
}

/// HTTP client for the payment provider.
#[derive(Clone)]
pub struct ProviderClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: secrecy::SecretString,
}

impl ProviderClient {
    /// Create a new provider client from configuration.
    #[must_use]
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        }
    }
}

/// Error body shape returned by the provider.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

impl PaymentProvider for ProviderClient {
    async fn create_intent(
        &self,
        order_id: OrderId,
        amount_minor: i64,
        currency: &str,
    ) -> Result<PaymentIntent, ProviderError> {
        let url = format!("{}/v1/payment_intents", self.base_url);

        // Amounts are posted in minor units; currency codes lowercase.
        let currency = currency.to_lowercase();
        let amount = amount_minor.to_string();
        let order_id = order_id.to_string();
        let params: Vec<(&str, &str)> = vec![
            ("amount", amount.as_str()),
            ("currency", currency.as_str()),
            ("metadata[order_id]", order_id.as_str()),
            ("automatic_payment_methods[enabled]", "true"),
        ];

        let response = self
            .client
            .post(&url)
            .basic_auth(self.secret_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<PaymentIntent>().await?)
    }
}
