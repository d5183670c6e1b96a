//! The durable order record.

use chrono::{DateTime, Utc};
use common::OrderId;
use serde::{Deserialize, Serialize};

use crate::customer::{Address, CustomerDetails};
use crate::pricing::PriceBreakdown;
use crate::reservation::Reservation;
use crate::value_objects::{GatewayOrderId, Money, ProductId, UserId};

use super::OrderStatus;

/// A line item copied into the order at materialization time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
}

impl OrderLine {
    /// Returns the total price for this line.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// The authoritative record of a completed transaction.
///
/// Created only by the order materializer, mutated only by status
/// transitions (plus the tracking URL), never deleted in normal
/// operation. `gateway_order_id` carries a unique index so at most one
/// order can ever exist per payment session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer: CustomerDetails,
    pub shipping_address: Address,
    pub lines: Vec<OrderLine>,
    pub pricing: PriceBreakdown,
    pub status: OrderStatus,
    pub gateway_order_id: GatewayOrderId,
    pub gateway_payment_id: String,
    pub tracking_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Builds a pending order from a consumed reservation and the
    /// verified gateway payment id.
    pub fn from_reservation(reservation: &Reservation, gateway_payment_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::new(),
            user_id: reservation.user_id,
            customer: reservation.customer.clone(),
            shipping_address: reservation.shipping_address.clone(),
            lines: reservation
                .lines
                .iter()
                .map(|line| OrderLine {
                    product_id: line.product_id.clone(),
                    name: line.name.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                })
                .collect(),
            pricing: reservation.pricing,
            status: OrderStatus::Pending,
            gateway_order_id: reservation.gateway_order_id.clone(),
            gateway_payment_id,
            tracking_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total amount charged for this order.
    pub fn total(&self) -> Money {
        self.pricing.total
    }
}
