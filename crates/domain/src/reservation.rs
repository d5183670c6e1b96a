//! Transient checkout reservations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::customer::{Address, CustomerDetails};
use crate::pricing::PriceBreakdown;
use crate::value_objects::{GatewayOrderId, Money, ProductId, UserId};

/// A product line frozen into a reservation at pricing time.
///
/// Copies name, unit price, and image so the order built from this
/// reservation is immune to later catalog edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl ReservedLine {
    /// Returns the total price for this line.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A checkout pending payment confirmation.
///
/// Created when a gateway session is opened and owned exclusively by
/// the reservation store until it is consumed by materialization or
/// expires. Never confirmed state: an order exists only after the
/// gateway reports a successful payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Gateway order id this reservation is keyed by.
    pub gateway_order_id: GatewayOrderId,

    /// Authenticated user who opened the checkout, if any.
    pub user_id: Option<UserId>,

    /// Customer contact details.
    pub customer: CustomerDetails,

    /// Shipping address.
    pub shipping_address: Address,

    /// Frozen product lines.
    pub lines: Vec<ReservedLine>,

    /// Frozen price breakdown; the gateway is charged `pricing.total`.
    pub pricing: PriceBreakdown,

    /// When the reservation was opened.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Reservation {
        Reservation {
            gateway_order_id: GatewayOrderId::new("order_abc"),
            user_id: None,
            customer: CustomerDetails {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                phone: "9999999999".to_string(),
            },
            shipping_address: Address {
                line1: "12 MG Road".to_string(),
                line2: None,
                city: "Bengaluru".to_string(),
                state: "KA".to_string(),
                postal_code: "560001".to_string(),
            },
            lines: vec![ReservedLine {
                product_id: ProductId::new("prod-001"),
                name: "Widget".to_string(),
                unit_price: Money::from_rupees(1050),
                quantity: 2,
                image: None,
            }],
            pricing: crate::PricingPolicy::default()
                .price(Money::from_rupees(2100), Money::zero()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_line_total() {
        let r = sample();
        assert_eq!(r.lines[0].line_total(), Money::from_rupees(2100));
    }

    #[test]
    fn test_serialization_roundtrip() {
        let r = sample();
        let json = serde_json::to_string(&r).unwrap();
        let back: Reservation = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
