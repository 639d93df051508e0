//! Order records and the order-creation draft.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{AddressId, OrderId, ProductId};
use super::status::{OrderStatus, PaymentStatus};

/// One cart line feeding into an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price in major currency units.
    pub unit_price: Decimal,
}

impl CartLine {
    /// Line total in major currency units.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Total amount of a set of cart lines in minor currency units (cents),
/// as required by the payment provider.
///
/// Rounds half-up after summing, matching how the provider expects amounts
/// to be quantized. Totals beyond `i64` saturate to `i64::MAX`, which the
/// provider rejects as over its amount limit; they must never collapse to
/// a zero (free) charge.
#[must_use]
pub fn amount_in_minor_units(lines: &[CartLine]) -> i64 {
    let total: Decimal = lines.iter().map(CartLine::total).sum();
    let cents = (total * Decimal::from(100)).round();
    cents.try_into().unwrap_or(i64::MAX)
}

/// The payload sent to the order-creation boundary.
///
/// `billing_address_id` defaults to `shipping_address_id` server-side when
/// omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub shipping_address_id: AddressId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address_id: Option<AddressId>,
    pub payment_method_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub lines: Vec<CartLine>,
}

/// A persisted order as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Human-readable order number, e.g. `MM-20260828-4F2A1C`.
    pub order_number: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub shipping_address_id: AddressId,
    pub billing_address_id: AddressId,
    pub payment_method_id: String,
    /// Total in major currency units.
    pub total_amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    pub provider_payment_intent_id: Option<String>,
    pub provider_client_secret: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: u32, unit_price: &str) -> CartLine {
        CartLine {
            product_id: ProductId::new(1),
            quantity,
            unit_price: unit_price.parse().expect("valid decimal"),
        }
    }

    #[test]
    fn test_line_total() {
        let expected: Decimal = "37.50".parse().expect("valid decimal");
        assert_eq!(line(3, "12.50").total(), expected);
    }

    #[test]
    fn test_amount_in_minor_units() {
        let lines = vec![line(2, "19.99"), line(1, "0.01")];
        assert_eq!(amount_in_minor_units(&lines), 3999);
    }

    #[test]
    fn test_amount_of_empty_cart_is_zero() {
        assert_eq!(amount_in_minor_units(&[]), 0);
    }

    #[test]
    fn test_amount_saturates_instead_of_wrapping_to_zero() {
        let lines = vec![line(1, "100000000000000000000")];
        assert_eq!(amount_in_minor_units(&lines), i64::MAX);
    }

    #[test]
    fn test_draft_omits_empty_billing_address() {
        let draft = OrderDraft {
            shipping_address_id: AddressId::new(5),
            billing_address_id: None,
            payment_method_id: "card".to_string(),
            notes: None,
            lines: Vec::new(),
        };
        let json = serde_json::to_value(&draft).expect("serializes");
        assert!(json.get("billingAddressId").is_none());
        assert!(json.get("notes").is_none());
    }
}
