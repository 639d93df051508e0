//! Order creation and payment intent reconciliation.
//!
//! Creating an order is two phases with a deliberate seam between them:
//! the order row commits in `pending` before the payment provider is
//! called, so a provider outage never loses the order. A failed provider
//! call surfaces as [`OrderError::Reconciliation`] carrying the order id,
//! and `retry_payment_attachment` picks the same order back up instead of
//! creating a new one.
//!
//! The service is generic over [`OrderStore`] and [`AddressDirectory`] so
//! these flows run against in-memory stores in tests.

use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use meridian_core::{Order, OrderDraft, OrderId, PaymentMethodKind, UserId};

use crate::db::{AddressDirectory, OrderStore, RepositoryError};
use crate::payments::{PaymentProvider, ProviderError};

/// Characters used for the random order number suffix. No 0/O or 1/I to
/// keep the number readable over the phone.
const ORDER_NUMBER_ALPHABET: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
const ORDER_NUMBER_SUFFIX_LEN: usize = 6;

/// Errors from order creation and reconciliation.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Database operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Order has no line items.
    #[error("order has no line items")]
    EmptyCart,

    /// An address id in the draft does not belong to the ordering user.
    #[error("address {0} does not belong to the ordering user")]
    AddressNotOwned(i32),

    /// The payment method id does not name a known method.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// Order not found.
    #[error("order not found")]
    NotFound,

    /// The order committed but the payment intent could not be created or
    /// attached. Recoverable via `retry_payment_attachment`.
    #[error("payment setup failed for order {order_id}: {source}")]
    Reconciliation {
        order_id: OrderId,
        #[source]
        source: ProviderError,
    },

    /// The order already carries a different payment intent.
    #[error("conflicting payment intent on order: {0}")]
    IntentConflict(String),
}

/// A created or reconciled order, with the client secret the caller needs
/// to complete payment on-device.
#[derive(Debug, Clone)]
pub struct CreatedOrder {
    pub order: Order,
    pub client_secret: Option<String>,
}

/// Service for order creation and payment reconciliation.
pub struct OrderService<'a, S, A, P> {
    orders: S,
    addresses: A,
    provider: P,
    currency: &'a str,
}

impl<'a, S, A, P> OrderService<'a, S, A, P>
where
    S: OrderStore + Sync,
    A: AddressDirectory + Sync,
    P: PaymentProvider + Sync,
{
    /// Create a new order service.
    #[must_use]
    pub const fn new(orders: S, addresses: A, provider: P, currency: &'a str) -> Self {
        Self {
            orders,
            addresses,
            provider,
            currency,
        }
    }

    /// Create an order from a finalized checkout draft.
    ///
    /// Provider-backed methods (card, BLIK, wallets) get a payment intent
    /// created and attached; bank transfer orders stay `pending` for
    /// manual settlement and return no client secret.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Reconciliation` when the order committed but
    /// the provider call failed; everything else failed before the order
    /// existed.
    #[instrument(skip(self, draft), fields(user_id = user_id.as_i32()))]
    pub async fn create(
        &self,
        user_id: UserId,
        draft: &OrderDraft,
    ) -> Result<CreatedOrder, OrderError> {
        if draft.lines.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let kind: PaymentMethodKind = draft
            .payment_method_id
            .parse()
            .map_err(|_| OrderError::UnknownPaymentMethod(draft.payment_method_id.clone()))?;

        self.check_address_ownership(user_id, draft).await?;

        let order_number = generate_order_number();
        let order = self
            .orders
            .create(user_id, &order_number, draft, self.currency)
            .await?;
        tracing::info!(order_id = %order.id, %order_number, "order created");

        if !kind.uses_provider() {
            // Bank transfer: pending until settlement is confirmed manually.
            return Ok(CreatedOrder {
                order,
                client_secret: None,
            });
        }

        self.attach_intent(order).await
    }

    /// Retry payment intent attachment for an order left unpaid by an
    /// earlier provider failure. Scoped to the calling user's own orders.
    ///
    /// A no-op success when the order already carries an intent.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for unknown orders (including
    /// another user's) and `OrderError::Reconciliation` if the provider
    /// fails again.
    #[instrument(skip(self), fields(order_id = %order_id, user_id = user_id.as_i32()))]
    pub async fn retry_payment_attachment(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<CreatedOrder, OrderError> {
        let order = self
            .orders
            .get(order_id, user_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if order.provider_payment_intent_id.is_some() {
            let client_secret = order.provider_client_secret.clone();
            return Ok(CreatedOrder {
                order,
                client_secret,
            });
        }

        let kind: PaymentMethodKind = order
            .payment_method_id
            .parse()
            .map_err(|_| OrderError::UnknownPaymentMethod(order.payment_method_id.clone()))?;
        if !kind.uses_provider() {
            return Ok(CreatedOrder {
                order,
                client_secret: None,
            });
        }

        self.attach_intent(order).await
    }

    async fn attach_intent(&self, mut order: Order) -> Result<CreatedOrder, OrderError> {
        let amount = self.orders.amount_minor(order.id).await?;

        let intent = self
            .provider
            .create_intent(order.id, amount, &order.currency)
            .await
            .map_err(|source| {
                tracing::warn!(order_id = %order.id, error = %source, "payment intent creation failed");
                OrderError::Reconciliation {
                    order_id: order.id,
                    source,
                }
            })?;

        self.orders
            .attach_payment_info(order.id, &intent.id, intent.client_secret.as_deref())
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(msg) => OrderError::IntentConflict(msg),
                RepositoryError::NotFound => OrderError::NotFound,
                other => OrderError::Repository(other),
            })?;
        tracing::info!(order_id = %order.id, intent_id = %intent.id, "payment intent attached");

        order.provider_payment_intent_id = Some(intent.id);
        order.provider_client_secret = intent.client_secret.clone();
        Ok(CreatedOrder {
            order,
            client_secret: intent.client_secret,
        })
    }

    async fn check_address_ownership(
        &self,
        user_id: UserId,
        draft: &OrderDraft,
    ) -> Result<(), OrderError> {
        if !self
            .addresses
            .belongs_to(draft.shipping_address_id, user_id)
            .await?
        {
            return Err(OrderError::AddressNotOwned(
                draft.shipping_address_id.as_i32(),
            ));
        }
        if let Some(billing) = draft.billing_address_id
            && billing != draft.shipping_address_id
            && !self.addresses.belongs_to(billing, user_id).await?
        {
            return Err(OrderError::AddressNotOwned(billing.as_i32()));
        }
        Ok(())
    }
}

/// Generate a human-readable order number, e.g. `MM-20260828-4F2A1C`.
#[must_use]
pub fn generate_order_number() -> String {
    let date = Utc::now().format("%Y%m%d");
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_NUMBER_SUFFIX_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ORDER_NUMBER_ALPHABET.len());
            char::from(ORDER_NUMBER_ALPHABET[idx])
        })
        .collect();
    format!("MM-{date}-{suffix}")
}
