//! HTTP route handlers.

pub mod checkout;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod webhook;

pub use self::checkout::AppState;
