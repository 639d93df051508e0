//! Full checkout runs: address defaulting, step navigation, and order
//! submission against in-memory boundary fakes.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;

use meridian_checkout::{
    AddressStore, BillingChoice, BoundaryError, CheckoutAction, CheckoutMachine, CheckoutState,
    OrderBoundary, OrderConfirmation, OrderSubmissionService, SubmissionError, ValidationField,
    available_payment_methods, seed_default_addresses,
};
use meridian_core::{
    AccountType, Address, AddressId, CartLine, Order, OrderDraft, OrderId, OrderStatus,
    PaymentMethodKind, PaymentMethodRef, PaymentStatus, Platform, ProductId, UserId,
};

// =============================================================================
// Fakes
// =============================================================================

struct FakeAddressBook {
    addresses: Vec<Address>,
}

impl AddressStore for FakeAddressBook {
    async fn list_addresses(&self, _user: UserId) -> Result<Vec<Address>, BoundaryError> {
        Ok(self.addresses.clone())
    }
}

/// Records every draft it receives and answers like the order API would.
#[derive(Default)]
struct FakeOrderApi {
    calls: AtomicU32,
    drafts: Mutex<Vec<OrderDraft>>,
}

impl OrderBoundary for FakeOrderApi {
    async fn create_order(&self, draft: &OrderDraft) -> Result<OrderConfirmation, BoundaryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.drafts.lock().expect("lock").push(draft.clone());

        let kind: PaymentMethodKind = draft
            .payment_method_id
            .parse()
            .map_err(|_| BoundaryError::Rejected("unknown payment method".to_string()))?;
        let secret = kind
            .uses_provider()
            .then(|| "pi_test_secret".to_string());

        let now = Utc::now();
        Ok(OrderConfirmation {
            order: Order {
                id: OrderId::generate(),
                order_number: "MM-20260828-TESTAA".to_string(),
                status: OrderStatus::Pending,
                payment_status: PaymentStatus::Pending,
                shipping_address_id: draft.shipping_address_id,
                billing_address_id: draft
                    .billing_address_id
                    .unwrap_or(draft.shipping_address_id),
                payment_method_id: draft.payment_method_id.clone(),
                total_amount: draft.lines.iter().map(CartLine::total).sum(),
                currency: "PLN".to_string(),
                provider_payment_intent_id: kind.uses_provider().then(|| "pi_test".to_string()),
                provider_client_secret: secret.clone(),
                created_at: now,
                updated_at: now,
            },
            provider_client_secret: secret,
        })
    }
}

fn address(id: i32, default_delivery: bool, default_billing: bool) -> Address {
    Address {
        id: AddressId::new(id),
        street: format!("Długa {id}"),
        city: "Warszawa".to_string(),
        postal_code: "00-238".to_string(),
        country: "PL".to_string(),
        is_default_delivery: default_delivery,
        is_default_billing: default_billing,
    }
}

fn cart() -> Vec<CartLine> {
    vec![
        CartLine {
            product_id: ProductId::new(11),
            quantity: 2,
            unit_price: "24.50".parse().expect("valid decimal"),
        },
        CartLine {
            product_id: ProductId::new(12),
            quantity: 1,
            unit_price: "5.00".parse().expect("valid decimal"),
        },
    ]
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn full_checkout_with_defaulted_addresses() {
    // Address book: flagged delivery default and a distinct billing default.
    let book = FakeAddressBook {
        addresses: vec![
            address(1, false, false),
            address(2, true, false),
            address(3, false, true),
        ],
    };
    let saved = book.list_addresses(UserId::new(42)).await.expect("listed");

    let mut machine = CheckoutMachine::default();
    let seeded = seed_default_addresses(machine.state().clone(), &saved);
    machine.apply(CheckoutAction::ResetCheckoutWithState(Box::new(seeded)));

    // Delivery default picked; billing flipped to the distinct default.
    assert_eq!(
        machine.state().delivery_address.as_ref().map(|a| a.id),
        Some(AddressId::new(2))
    );
    assert_eq!(
        machine.state().billing,
        BillingChoice::Distinct(address(3, false, true))
    );

    // Walk the steps to review.
    assert!(machine.can_proceed());
    machine.apply(CheckoutAction::NextStep);
    machine.apply(CheckoutAction::SetPaymentMethod(PaymentMethodRef::of_kind(
        PaymentMethodKind::Blik,
    )));
    assert!(machine.can_proceed());
    machine.apply(CheckoutAction::NextStep);
    machine.apply(CheckoutAction::SetAgreedToTerms(true));
    assert!(machine.can_proceed());

    // Submit; the draft keeps the distinct billing id.
    let api = FakeOrderApi::default();
    let service = OrderSubmissionService::new(&api);
    let confirmation = service.submit(machine.state(), cart()).await.expect("created");

    assert_eq!(confirmation.order.billing_address_id, AddressId::new(3));
    assert_eq!(
        confirmation.provider_client_secret.as_deref(),
        Some("pi_test_secret")
    );
    let expected_total: rust_decimal::Decimal = "54.00".parse().expect("valid decimal");
    assert_eq!(confirmation.order.total_amount, expected_total);

    let drafts = api.drafts.lock().expect("lock");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].billing_address_id, Some(AddressId::new(3)));
}

#[tokio::test]
async fn same_as_delivery_omits_billing_in_the_draft() {
    let saved = vec![address(7, true, true)];

    let mut machine = CheckoutMachine::default();
    let seeded = seed_default_addresses(machine.state().clone(), &saved);
    machine.apply(CheckoutAction::ResetCheckoutWithState(Box::new(seeded)));

    // The default billing address is the delivery pick itself, so the
    // choice stays same-as-delivery.
    assert_eq!(machine.state().billing, BillingChoice::SameAsDelivery);

    machine.apply(CheckoutAction::SetPaymentMethod(PaymentMethodRef::of_kind(
        PaymentMethodKind::Card,
    )));
    machine.apply(CheckoutAction::SetAgreedToTerms(true));

    let api = FakeOrderApi::default();
    let service = OrderSubmissionService::new(&api);
    let confirmation = service.submit(machine.state(), cart()).await.expect("created");

    // Server defaulted billing to shipping.
    assert_eq!(confirmation.order.billing_address_id, AddressId::new(7));
    let drafts = api.drafts.lock().expect("lock");
    assert_eq!(drafts[0].billing_address_id, None);
}

#[tokio::test]
async fn bank_transfer_checkout_gets_no_client_secret() {
    let mut machine = CheckoutMachine::default();
    machine.apply(CheckoutAction::SetDeliveryAddress(address(1, false, false)));
    machine.apply(CheckoutAction::SetPaymentMethod(PaymentMethodRef::of_kind(
        PaymentMethodKind::BankTransfer,
    )));
    machine.apply(CheckoutAction::SetAgreedToTerms(true));

    // Bank transfer is only offered to business accounts in the first place.
    let offered = available_payment_methods(AccountType::Business, Platform::Web);
    assert!(
        offered
            .iter()
            .any(|m| m.kind == PaymentMethodKind::BankTransfer)
    );
    let offered_individual = available_payment_methods(AccountType::Individual, Platform::Web);
    assert!(
        !offered_individual
            .iter()
            .any(|m| m.kind == PaymentMethodKind::BankTransfer)
    );

    let api = FakeOrderApi::default();
    let service = OrderSubmissionService::new(&api);
    let confirmation = service.submit(machine.state(), cart()).await.expect("created");

    assert_eq!(confirmation.provider_client_secret, None);
    assert_eq!(confirmation.order.payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn incomplete_checkout_never_reaches_the_order_api() {
    let mut machine = CheckoutMachine::default();
    machine.apply(CheckoutAction::SetDeliveryAddress(address(1, false, false)));
    machine.apply(CheckoutAction::SetPaymentMethod(PaymentMethodRef::of_kind(
        PaymentMethodKind::Card,
    )));
    // Terms never agreed.

    let api = FakeOrderApi::default();
    let service = OrderSubmissionService::new(&api);
    let err = service
        .submit(machine.state(), cart())
        .await
        .expect_err("invalid");

    match err {
        SubmissionError::Validation(v) => assert_eq!(v.field, ValidationField::AgreedToTerms),
        other => panic!("expected validation error, got {other}"),
    }
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn defaulting_leaves_an_in_progress_checkout_alone() {
    let state = CheckoutState {
        delivery_address: Some(address(9, false, false)),
        ..CheckoutState::default()
    };

    let seeded = seed_default_addresses(state.clone(), &[address(2, true, false)]);
    assert_eq!(seeded, state);
}

#[test]
fn wallet_availability_follows_the_platform() {
    let ios = available_payment_methods(AccountType::Individual, Platform::Ios);
    assert!(ios.iter().any(|m| m.kind == PaymentMethodKind::ApplePay));
    assert!(!ios.iter().any(|m| m.kind == PaymentMethodKind::GooglePay));

    let android = available_payment_methods(AccountType::Individual, Platform::Android);
    assert!(android.iter().any(|m| m.kind == PaymentMethodKind::GooglePay));
    assert!(!android.iter().any(|m| m.kind == PaymentMethodKind::ApplePay));

    // Card and BLIK are everywhere.
    for methods in [&ios, &android] {
        assert!(methods.iter().any(|m| m.kind == PaymentMethodKind::Card));
        assert!(methods.iter().any(|m| m.kind == PaymentMethodKind::Blik));
    }
}
