//! Payment method references and availability inputs.

use serde::{Deserialize, Serialize};

/// The kind of payment method, determining how the provider intent is
/// configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethodKind {
    Card,
    Blik,
    ApplePay,
    GooglePay,
    BankTransfer,
}

impl PaymentMethodKind {
    /// Whether this method is settled through the payment provider (as
    /// opposed to an offline transfer confirmed out of band).
    #[must_use]
    pub const fn uses_provider(self) -> bool {
        !matches!(self, Self::BankTransfer)
    }
}

impl std::fmt::Display for PaymentMethodKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Card => "card",
            Self::Blik => "blik",
            Self::ApplePay => "apple_pay",
            Self::GooglePay => "google_pay",
            Self::BankTransfer => "bank_transfer",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentMethodKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "blik" => Ok(Self::Blik),
            "apple_pay" => Ok(Self::ApplePay),
            "google_pay" => Ok(Self::GooglePay),
            "bank_transfer" => Ok(Self::BankTransfer),
            _ => Err(format!("invalid payment method kind: {s}")),
        }
    }
}

/// A reference to a selectable payment method.
///
/// Checkout holds these by value; `id` is what the order boundary receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethodRef {
    pub id: String,
    pub kind: PaymentMethodKind,
}

impl PaymentMethodRef {
    /// Create a reference whose id is the kind's canonical name.
    #[must_use]
    pub fn of_kind(kind: PaymentMethodKind) -> Self {
        Self {
            id: kind.to_string(),
            kind,
        }
    }
}

/// Account classification affecting which payment methods are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    #[default]
    Individual,
    Business,
}

/// The client platform running checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Ios,
    Android,
    Web,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_kind_roundtrip() {
        for kind in [
            PaymentMethodKind::Card,
            PaymentMethodKind::Blik,
            PaymentMethodKind::ApplePay,
            PaymentMethodKind::GooglePay,
            PaymentMethodKind::BankTransfer,
        ] {
            let parsed = PaymentMethodKind::from_str(&kind.to_string());
            assert_eq!(parsed, Ok(kind));
        }
    }

    #[test]
    fn test_invalid_kind_rejected() {
        assert!(PaymentMethodKind::from_str("cheque").is_err());
    }

    #[test]
    fn test_bank_transfer_skips_provider() {
        assert!(!PaymentMethodKind::BankTransfer.uses_provider());
        assert!(PaymentMethodKind::Card.uses_provider());
    }
}
