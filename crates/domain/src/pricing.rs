//! Deterministic checkout pricing.
//!
//! Catalog prices are tax-inclusive (5% GST). The breakdown is computed
//! once, at reservation time, and frozen; the gateway is charged the
//! frozen total and nothing downstream ever recomputes it.

use serde::{Deserialize, Serialize};

use crate::value_objects::Money;

/// The frozen price breakdown of a checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Pre-tax subtotal, `round(subtotal / 1.05)`.
    pub base_subtotal: Money,

    /// GST portion, `subtotal - base_subtotal`.
    pub tax: Money,

    /// Flat shipping fee, zero above the free-shipping threshold.
    pub shipping_fee: Money,

    /// Discount applied before shipping. Zero unless a coupon was used.
    pub discount: Money,

    /// Amount charged to the gateway.
    pub total: Money,
}

/// Pricing policy: shipping fee schedule.
#[derive(Debug, Clone, Copy)]
pub struct PricingPolicy {
    /// Flat fee charged when the subtotal is at or below the threshold.
    pub flat_shipping_fee: Money,

    /// Subtotals strictly above this ship free.
    pub free_shipping_threshold: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            flat_shipping_fee: Money::from_rupees(99),
            free_shipping_threshold: Money::from_rupees(5000),
        }
    }
}

impl PricingPolicy {
    /// Prices a tax-inclusive subtotal with an optional discount.
    pub fn price(&self, subtotal: Money, discount: Money) -> PriceBreakdown {
        let base_subtotal = strip_gst(subtotal);
        let tax = subtotal - base_subtotal;
        let shipping_fee = if subtotal > self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_shipping_fee
        };
        let total = subtotal - discount + shipping_fee;

        PriceBreakdown {
            base_subtotal,
            tax,
            shipping_fee,
            discount,
            total,
        }
    }
}

/// Computes `round(amount / 1.05)` in integer arithmetic.
///
/// `n / 1.05 == 20n / 21`, and `(40n + 21) / 42` rounds that half-up,
/// matching the original reconciliation maths exactly. For integer `n`
/// the quotient never lands on an exact half, so half-up and
/// half-to-even agree.
fn strip_gst(amount: Money) -> Money {
    let n = amount.paise();
    Money::from_paise((n * 40 + 21) / 42)
}
