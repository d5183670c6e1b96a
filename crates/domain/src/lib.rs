//! Domain model for the checkout-to-order reconciliation service.
//!
//! This crate holds the pure types and rules shared by the store,
//! gateway, and checkout crates:
//! - identifier newtypes and `Money` (integer paise)
//! - the product catalog types and client-supplied cart lines
//! - the deterministic pricing policy (tax-inclusive prices)
//! - the transient `Reservation` and the durable `Order`
//! - the `OrderStatus` state machine

pub mod customer;
pub mod order;
pub mod pricing;
pub mod product;
pub mod reservation;
pub mod value_objects;

pub use customer::{Address, CustomerDetails};
pub use order::{Order, OrderLine, OrderStatus, ParseOrderStatusError};
pub use pricing::{PriceBreakdown, PricingPolicy};
pub use product::{CartLine, Product};
pub use reservation::{Reservation, ReservedLine};
pub use value_objects::{GatewayOrderId, Money, ProductId, UserId};
