//! Address defaulting policy.
//!
//! Runs once, when the address book first becomes available and the user
//! has not chosen a delivery address yet. Re-running after the user has
//! made a choice must not override it.

use meridian_core::Address;

use crate::state::{BillingChoice, CheckoutState};

/// Seed initial delivery/billing addresses from the user's saved set.
///
/// - Empty list: state is returned unchanged.
/// - Delivery: the address flagged default-delivery, else the first one.
/// - Billing: the address flagged default-billing, else the delivery pick.
/// - The billing choice flips to `Distinct` only when a genuine billing
///   default differs from the delivery pick; otherwise the existing choice
///   stands (same-as-delivery semantics upstream).
///
/// Guarded on `delivery_address` being unset: a state with a chosen
/// delivery address passes through untouched regardless of list contents.
#[must_use]
pub fn seed_default_addresses(state: CheckoutState, addresses: &[Address]) -> CheckoutState {
    if state.delivery_address.is_some() {
        return state;
    }
    let Some(first) = addresses.first() else {
        return state;
    };

    let delivery = addresses
        .iter()
        .find(|a| a.is_default_delivery)
        .unwrap_or(first);

    let billing_default = addresses.iter().find(|a| a.is_default_billing);

    let billing = match billing_default {
        Some(billing) if billing.id != delivery.id => BillingChoice::Distinct(billing.clone()),
        _ => state.billing,
    };

    CheckoutState {
        delivery_address: Some(delivery.clone()),
        billing,
        ..state
    }
}
