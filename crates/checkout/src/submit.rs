//! Order submission.
//!
//! Takes a finalized checkout snapshot, validates preconditions locally,
//! and makes exactly one call to the order boundary. Submission is never
//! retried automatically: order creation is not idempotent, so a retry
//! after an ambiguous failure could create a duplicate order.

use meridian_core::{CartLine, OrderDraft};

use crate::boundary::{OrderBoundary, OrderConfirmation};
use crate::error::{SubmissionError, ValidationError, ValidationField};
use crate::state::{BillingChoice, CheckoutState};

/// Submits finalized checkout state to the order-creation boundary.
pub struct OrderSubmissionService<B> {
    boundary: B,
}

impl<B: OrderBoundary> OrderSubmissionService<B> {
    pub const fn new(boundary: B) -> Self {
        Self { boundary }
    }

    /// Build the order draft from a checkout snapshot, failing fast on the
    /// first unmet precondition. No network call is made here.
    ///
    /// Billing is resolved before the draft leaves the client: the
    /// same-as-delivery choice collapses to the concrete delivery address,
    /// expressed as an omitted billing id (the server defaults it).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the missing field.
    pub fn finalize(
        state: &CheckoutState,
        lines: Vec<CartLine>,
    ) -> Result<OrderDraft, ValidationError> {
        let delivery = state
            .delivery_address
            .as_ref()
            .ok_or(ValidationError::new(ValidationField::DeliveryAddress))?;

        let payment_method = state
            .selected_payment_method
            .as_ref()
            .ok_or(ValidationError::new(ValidationField::PaymentMethod))?;

        if !state.agreed_to_terms {
            return Err(ValidationError::new(ValidationField::AgreedToTerms));
        }

        let billing_address_id = match &state.billing {
            BillingChoice::SameAsDelivery => None,
            BillingChoice::Distinct(address) => Some(address.id),
        };

        let notes = state.notes.trim();

        Ok(OrderDraft {
            shipping_address_id: delivery.id,
            billing_address_id,
            payment_method_id: payment_method.id.clone(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            lines,
        })
    }

    /// Validate, then submit the order. On success, returns the created
    /// order plus any provider client secret needed to confirm payment on
    /// the client.
    ///
    /// # Errors
    ///
    /// Returns `SubmissionError::Validation` before any network call when
    /// a precondition fails, and `SubmissionError::Boundary` when the
    /// order-creation call itself fails. Neither is retried here; the
    /// caller must present the error and require explicit re-submission.
    pub async fn submit(
        &self,
        state: &CheckoutState,
        lines: Vec<CartLine>,
    ) -> Result<OrderConfirmation, SubmissionError> {
        let draft = Self::finalize(state, lines)?;

        tracing::debug!(
            shipping_address_id = %draft.shipping_address_id,
            payment_method_id = %draft.payment_method_id,
            "submitting order"
        );

        let confirmation = self.boundary.create_order(&draft).await?;

        tracing::info!(
            order_id = %confirmation.order.id,
            order_number = %confirmation.order.order_number,
            "order created"
        );

        Ok(confirmation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::BoundaryError;
    use chrono::Utc;
    use meridian_core::{
        Address, AddressId, Order, OrderId, OrderStatus, PaymentMethodKind, PaymentMethodRef,
        PaymentStatus, ProductId,
    };
    use std::sync::atomic::{AtomicU32, Ordering};

    fn address(id: i32) -> Address {
        Address {
            id: AddressId::new(id),
            street: format!("Street {id}"),
            city: "Poznań".to_string(),
            postal_code: "60-001".to_string(),
            country: "PL".to_string(),
            is_default_delivery: false,
            is_default_billing: false,
        }
    }

    fn ready_state() -> CheckoutState {
        CheckoutState {
            delivery_address: Some(address(1)),
            selected_payment_method: Some(PaymentMethodRef::of_kind(PaymentMethodKind::Card)),
            agreed_to_terms: true,
            notes: "  ring twice  ".to_string(),
            ..CheckoutState::default()
        }
    }

    fn lines() -> Vec<CartLine> {
        vec![CartLine {
            product_id: ProductId::new(10),
            quantity: 2,
            unit_price: "9.99".parse().expect("valid decimal"),
        }]
    }

    #[derive(Default)]
    struct FakeOrderBoundary {
        calls: AtomicU32,
        fail: bool,
    }

    impl OrderBoundary for FakeOrderBoundary {
        async fn create_order(
            &self,
            draft: &OrderDraft,
        ) -> Result<OrderConfirmation, BoundaryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BoundaryError::Unreachable("gateway timeout".to_string()));
            }
            let now = Utc::now();
            Ok(OrderConfirmation {
                order: Order {
                    id: OrderId::generate(),
                    order_number: "MM-20260828-4F2A1C".to_string(),
                    status: OrderStatus::Pending,
                    payment_status: PaymentStatus::Pending,
                    shipping_address_id: draft.shipping_address_id,
                    billing_address_id: draft
                        .billing_address_id
                        .unwrap_or(draft.shipping_address_id),
                    payment_method_id: draft.payment_method_id.clone(),
                    total_amount: "19.98".parse().expect("valid decimal"),
                    currency: "PLN".to_string(),
                    provider_payment_intent_id: Some("pi_123".to_string()),
                    provider_client_secret: Some("pi_123_secret".to_string()),
                    created_at: now,
                    updated_at: now,
                },
                provider_client_secret: Some("pi_123_secret".to_string()),
            })
        }
    }

    #[test]
    fn test_finalize_resolves_same_as_delivery_to_omitted_billing() {
        let draft = OrderSubmissionService::<FakeOrderBoundary>::finalize(&ready_state(), lines())
            .expect("valid");
        assert_eq!(draft.shipping_address_id, AddressId::new(1));
        assert_eq!(draft.billing_address_id, None);
        assert_eq!(draft.notes.as_deref(), Some("ring twice"));
    }

    #[test]
    fn test_finalize_keeps_distinct_billing() {
        let state = CheckoutState {
            billing: BillingChoice::Distinct(address(7)),
            ..ready_state()
        };
        let draft =
            OrderSubmissionService::<FakeOrderBoundary>::finalize(&state, lines()).expect("valid");
        assert_eq!(draft.billing_address_id, Some(AddressId::new(7)));
    }

    #[test]
    fn test_missing_delivery_address_names_field() {
        let state = CheckoutState {
            delivery_address: None,
            ..ready_state()
        };
        let err =
            OrderSubmissionService::<FakeOrderBoundary>::finalize(&state, lines()).expect_err("invalid");
        assert_eq!(err.field, ValidationField::DeliveryAddress);
    }

    #[tokio::test]
    async fn test_unagreed_terms_never_reach_the_boundary() {
        let boundary = FakeOrderBoundary::default();
        let service = OrderSubmissionService::new(&boundary);

        let state = CheckoutState {
            agreed_to_terms: false,
            ..ready_state()
        };
        let err = service.submit(&state, lines()).await.expect_err("invalid");

        assert!(matches!(
            err,
            SubmissionError::Validation(ValidationError {
                field: ValidationField::AgreedToTerms
            })
        ));
        assert_eq!(boundary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_successful_submission_returns_client_secret() {
        let boundary = FakeOrderBoundary::default();
        let service = OrderSubmissionService::new(&boundary);

        let confirmation = service.submit(&ready_state(), lines()).await.expect("created");
        assert_eq!(
            confirmation.provider_client_secret.as_deref(),
            Some("pi_123_secret")
        );
        assert_eq!(boundary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_boundary_failure_is_surfaced_without_retry() {
        let boundary = FakeOrderBoundary {
            fail: true,
            ..FakeOrderBoundary::default()
        };
        let service = OrderSubmissionService::new(&boundary);

        let err = service
            .submit(&ready_state(), lines())
            .await
            .expect_err("boundary down");
        assert!(matches!(err, SubmissionError::Boundary(_)));
        assert_eq!(boundary.calls.load(Ordering::SeqCst), 1);
    }
}
