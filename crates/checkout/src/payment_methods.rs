//! Payment method availability.
//!
//! The offered list depends on the client platform (wallet availability)
//! and the account type (bank transfer is a business-only arrangement).

use meridian_core::{AccountType, PaymentMethodKind, PaymentMethodRef, Platform};

/// Payment methods available to this account on this platform, in display
/// order.
#[must_use]
pub fn available_payment_methods(account: AccountType, platform: Platform) -> Vec<PaymentMethodRef> {
    let mut methods = vec![
        PaymentMethodRef::of_kind(PaymentMethodKind::Card),
        PaymentMethodRef::of_kind(PaymentMethodKind::Blik),
    ];

    match platform {
        Platform::Ios => methods.push(PaymentMethodRef::of_kind(PaymentMethodKind::ApplePay)),
        Platform::Android => methods.push(PaymentMethodRef::of_kind(PaymentMethodKind::GooglePay)),
        Platform::Web => {}
    }

    if account == AccountType::Business {
        methods.push(PaymentMethodRef::of_kind(PaymentMethodKind::BankTransfer));
    }

    methods
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(account: AccountType, platform: Platform) -> Vec<PaymentMethodKind> {
        available_payment_methods(account, platform)
            .into_iter()
            .map(|m| m.kind)
            .collect()
    }

    #[test]
    fn test_individual_on_web_gets_card_and_blik() {
        assert_eq!(
            kinds(AccountType::Individual, Platform::Web),
            vec![PaymentMethodKind::Card, PaymentMethodKind::Blik]
        );
    }

    #[test]
    fn test_wallets_follow_platform() {
        assert!(kinds(AccountType::Individual, Platform::Ios).contains(&PaymentMethodKind::ApplePay));
        assert!(
            kinds(AccountType::Individual, Platform::Android)
                .contains(&PaymentMethodKind::GooglePay)
        );
        assert!(!kinds(AccountType::Individual, Platform::Ios).contains(&PaymentMethodKind::GooglePay));
    }

    #[test]
    fn test_bank_transfer_is_business_only() {
        assert!(kinds(AccountType::Business, Platform::Web).contains(&PaymentMethodKind::BankTransfer));
        assert!(
            !kinds(AccountType::Individual, Platform::Web)
                .contains(&PaymentMethodKind::BankTransfer)
        );
    }
}
