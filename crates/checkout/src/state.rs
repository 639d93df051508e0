//! Checkout state machine.
//!
//! State is owned exclusively by one [`CheckoutMachine`] for the duration of
//! a checkout session and changes only through [`CheckoutAction`]s applied
//! by the pure [`reduce`] function. The reducer is total: it never fails and
//! never performs I/O.

use serde::{Deserialize, Serialize};

use meridian_core::{Address, PaymentMethodRef};

/// Step index for address selection.
pub const STEP_ADDRESS: usize = 1;
/// Step index for payment method selection.
pub const STEP_PAYMENT: usize = 2;
/// Step index for review and terms agreement.
pub const STEP_REVIEW: usize = 3;

/// The billing address choice.
///
/// Modeled as a tagged union instead of a boolean plus nullable address, so
/// a stale distinct address can never coexist with the same-as-delivery
/// choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BillingChoice {
    /// Billing mirrors the delivery address at submission time.
    #[default]
    SameAsDelivery,
    /// Billing goes to an explicitly chosen address.
    Distinct(Address),
}

impl BillingChoice {
    /// Resolve the concrete billing address given the delivery address.
    #[must_use]
    pub fn resolve<'a>(&'a self, delivery: &'a Address) -> &'a Address {
        match self {
            Self::SameAsDelivery => delivery,
            Self::Distinct(address) => address,
        }
    }
}

/// The full checkout state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutState {
    /// Index into the ordered step sequence. Bounds are a UI concern; the
    /// state itself enforces none beyond staying non-negative.
    pub current_step: usize,
    pub delivery_address: Option<Address>,
    pub billing: BillingChoice,
    pub selected_payment_method: Option<PaymentMethodRef>,
    pub agreed_to_terms: bool,
    pub notes: String,
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self {
            current_step: STEP_ADDRESS,
            delivery_address: None,
            billing: BillingChoice::SameAsDelivery,
            selected_payment_method: None,
            agreed_to_terms: false,
            notes: String::new(),
        }
    }
}

/// Actions recognized by the reducer.
///
/// The enum is `#[non_exhaustive]` so external dispatch code must tolerate
/// future actions; the reducer treats anything it does not handle as a
/// no-op rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutAction {
    SetCurrentStep(usize),
    NextStep,
    PrevStep,
    SetDeliveryAddress(Address),
    SetBillingAddress(Address),
    SetBillingSameAsDelivery(bool),
    SetPaymentMethod(PaymentMethodRef),
    SetAgreedToTerms(bool),
    SetNotes(String),
    ResetCheckout,
    ResetCheckoutWithState(Box<CheckoutState>),
}

/// Pure transition function: `(state, action) -> state`.
///
/// `initial` is the machine's original snapshot, used by `ResetCheckout`.
#[must_use]
pub fn reduce(
    state: CheckoutState,
    action: CheckoutAction,
    initial: &CheckoutState,
) -> CheckoutState {
    match action {
        CheckoutAction::SetCurrentStep(step) => CheckoutState {
            current_step: step,
            ..state
        },
        CheckoutAction::NextStep => CheckoutState {
            current_step: state.current_step + 1,
            ..state
        },
        // Saturates rather than panicking; callers should not step below
        // the first step anyway.
        CheckoutAction::PrevStep => CheckoutState {
            current_step: state.current_step.saturating_sub(1),
            ..state
        },
        CheckoutAction::SetDeliveryAddress(address) => CheckoutState {
            delivery_address: Some(address),
            ..state
        },
        CheckoutAction::SetBillingAddress(address) => CheckoutState {
            billing: BillingChoice::Distinct(address),
            ..state
        },
        CheckoutAction::SetBillingSameAsDelivery(same) => {
            if same {
                CheckoutState {
                    billing: BillingChoice::SameAsDelivery,
                    ..state
                }
            } else {
                // No distinct address to switch to yet; the caller follows
                // up with SetBillingAddress.
                state
            }
        }
        CheckoutAction::SetPaymentMethod(method) => CheckoutState {
            selected_payment_method: Some(method),
            ..state
        },
        CheckoutAction::SetAgreedToTerms(agreed) => CheckoutState {
            agreed_to_terms: agreed,
            ..state
        },
        CheckoutAction::SetNotes(notes) => CheckoutState { notes, ..state },
        CheckoutAction::ResetCheckout => initial.clone(),
        CheckoutAction::ResetCheckoutWithState(new_state) => *new_state,
    }
}

/// A checkout state machine instance.
///
/// Owns the state for one checkout session and remembers the initial
/// snapshot for `ResetCheckout`. All transitions are synchronous pure
/// reductions; the machine is discarded when checkout completes or is
/// abandoned.
#[derive(Debug, Clone)]
pub struct CheckoutMachine {
    initial: CheckoutState,
    state: CheckoutState,
}

impl CheckoutMachine {
    /// Create a machine from an initial snapshot.
    #[must_use]
    pub fn new(initial: CheckoutState) -> Self {
        Self {
            state: initial.clone(),
            initial,
        }
    }

    /// The current state.
    #[must_use]
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// The machine's original initial snapshot.
    #[must_use]
    pub fn initial(&self) -> &CheckoutState {
        &self.initial
    }

    /// Apply an action, replacing the current state with the reduction.
    pub fn apply(&mut self, action: CheckoutAction) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action, &self.initial);
    }

    /// Whether the user may advance past the current step.
    #[must_use]
    pub fn can_proceed(&self) -> bool {
        match self.state.current_step {
            STEP_ADDRESS => self.state.delivery_address.is_some(),
            STEP_PAYMENT => self.state.selected_payment_method.is_some(),
            STEP_REVIEW => self.state.agreed_to_terms,
            _ => false,
        }
    }
}

impl Default for CheckoutMachine {
    fn default() -> Self {
        Self::new(CheckoutState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::{AddressId, PaymentMethodKind};

    fn address(id: i32) -> Address {
        Address {
            id: AddressId::new(id),
            street: format!("Street {id}"),
            city: "Gdańsk".to_string(),
            postal_code: "80-001".to_string(),
            country: "PL".to_string(),
            is_default_delivery: false,
            is_default_billing: false,
        }
    }

    #[test]
    fn test_step_navigation() {
        let mut machine = CheckoutMachine::default();
        assert_eq!(machine.state().current_step, STEP_ADDRESS);

        machine.apply(CheckoutAction::NextStep);
        assert_eq!(machine.state().current_step, STEP_PAYMENT);

        machine.apply(CheckoutAction::SetCurrentStep(STEP_REVIEW));
        assert_eq!(machine.state().current_step, STEP_REVIEW);

        machine.apply(CheckoutAction::PrevStep);
        assert_eq!(machine.state().current_step, STEP_PAYMENT);
    }

    #[test]
    fn test_prev_step_saturates_at_zero() {
        let mut machine = CheckoutMachine::new(CheckoutState {
            current_step: 0,
            ..CheckoutState::default()
        });
        machine.apply(CheckoutAction::PrevStep);
        assert_eq!(machine.state().current_step, 0);
    }

    #[test]
    fn test_set_billing_same_clears_distinct_address() {
        let mut machine = CheckoutMachine::default();
        machine.apply(CheckoutAction::SetBillingAddress(address(2)));
        assert!(matches!(
            machine.state().billing,
            BillingChoice::Distinct(_)
        ));

        machine.apply(CheckoutAction::SetBillingSameAsDelivery(true));
        assert_eq!(machine.state().billing, BillingChoice::SameAsDelivery);
    }

    #[test]
    fn test_same_as_delivery_is_idempotent() {
        let mut machine = CheckoutMachine::default();
        machine.apply(CheckoutAction::SetBillingSameAsDelivery(true));
        let once = machine.state().clone();

        machine.apply(CheckoutAction::SetBillingSameAsDelivery(true));
        machine.apply(CheckoutAction::SetBillingSameAsDelivery(true));
        assert_eq!(machine.state(), &once);

        // true -> false -> true ends where a single true would
        machine.apply(CheckoutAction::SetBillingSameAsDelivery(false));
        machine.apply(CheckoutAction::SetBillingSameAsDelivery(true));
        assert_eq!(machine.state(), &once);
    }

    #[test]
    fn test_reducer_is_deterministic() {
        let actions = vec![
            CheckoutAction::SetDeliveryAddress(address(1)),
            CheckoutAction::SetBillingAddress(address(2)),
            CheckoutAction::NextStep,
            CheckoutAction::SetPaymentMethod(PaymentMethodRef::of_kind(PaymentMethodKind::Blik)),
            CheckoutAction::SetNotes("leave at the door".to_string()),
            CheckoutAction::SetAgreedToTerms(true),
        ];

        let initial = CheckoutState::default();
        let run = |actions: &[CheckoutAction]| {
            actions.iter().fold(initial.clone(), |state, action| {
                reduce(state, action.clone(), &initial)
            })
        };

        assert_eq!(run(&actions), run(&actions));
    }

    #[test]
    fn test_reset_restores_initial_snapshot() {
        let initial = CheckoutState {
            notes: "preset".to_string(),
            ..CheckoutState::default()
        };
        let mut machine = CheckoutMachine::new(initial.clone());

        machine.apply(CheckoutAction::SetDeliveryAddress(address(1)));
        machine.apply(CheckoutAction::SetAgreedToTerms(true));
        machine.apply(CheckoutAction::ResetCheckout);

        assert_eq!(machine.state(), &initial);
    }

    #[test]
    fn test_reset_with_state_replaces_verbatim() {
        let mut machine = CheckoutMachine::default();
        let resumed = CheckoutState {
            current_step: STEP_REVIEW,
            delivery_address: Some(address(3)),
            billing: BillingChoice::Distinct(address(4)),
            selected_payment_method: Some(PaymentMethodRef::of_kind(PaymentMethodKind::Card)),
            agreed_to_terms: true,
            notes: "resumed".to_string(),
        };

        machine.apply(CheckoutAction::ResetCheckoutWithState(Box::new(
            resumed.clone(),
        )));
        assert_eq!(machine.state(), &resumed);

        // ResetCheckout still goes back to the machine's own initial state,
        // not the resumed one.
        machine.apply(CheckoutAction::ResetCheckout);
        assert_eq!(machine.state(), &CheckoutState::default());
    }

    #[test]
    fn test_can_proceed_gates_each_step() {
        let mut machine = CheckoutMachine::default();
        assert!(!machine.can_proceed());

        machine.apply(CheckoutAction::SetDeliveryAddress(address(1)));
        assert!(machine.can_proceed());

        machine.apply(CheckoutAction::NextStep);
        assert!(!machine.can_proceed());
        machine.apply(CheckoutAction::SetPaymentMethod(PaymentMethodRef::of_kind(
            PaymentMethodKind::Card,
        )));
        assert!(machine.can_proceed());

        machine.apply(CheckoutAction::NextStep);
        assert!(!machine.can_proceed());
        machine.apply(CheckoutAction::SetAgreedToTerms(true));
        assert!(machine.can_proceed());
    }

    #[test]
    fn test_billing_resolution() {
        let delivery = address(1);
        assert_eq!(BillingChoice::SameAsDelivery.resolve(&delivery), &delivery);

        let distinct = address(2);
        let choice = BillingChoice::Distinct(distinct.clone());
        assert_eq!(choice.resolve(&delivery), &distinct);
    }
}
