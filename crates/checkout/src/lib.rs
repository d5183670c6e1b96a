//! The checkout-to-order reconciliation workflow.
//!
//! A checkout moves through three stages:
//! 1. no reservation — the client holds only an ephemeral cart;
//! 2. reserved — a gateway payment session is open and a TTL-bound
//!    reservation freezes the lines and the price breakdown;
//! 3. materialized — payment verified, a durable order exists and the
//!    inventory ledger has been applied exactly once.
//!
//! Two independent triggers (the client's confirmation call and the
//! gateway webhook) converge on the same idempotent materialization
//! procedure; the unique index on the order's gateway order id decides
//! any race. Ledger failures mid-order are compensated, never left
//! half-applied.

pub mod dispatch;
pub mod error;
pub mod service;

pub use dispatch::{
    DispatchError, EmailNotifier, FulfillmentService, LoggingFulfillment, LoggingNotifier,
    RecordingFulfillment, RecordingNotifier,
};
pub use error::CheckoutError;
pub use service::{CheckoutConfig, CheckoutRequest, CheckoutService, CheckoutSession};
