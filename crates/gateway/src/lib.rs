//! Payment gateway adapter.
//!
//! The gateway is an external HTTP collaborator: it opens payment
//! sessions, reports payment attempts, and calls back over a signed
//! webhook. This crate holds the [`PaymentGateway`] trait, the live
//! HTTP implementation, webhook payload types with HMAC signature
//! verification, and a scriptable mock for tests.

pub mod client;
pub mod error;
pub mod http;
pub mod mock;
pub mod webhook;

pub use client::{
    CreateSessionRequest, PaymentAttempt, PaymentGateway, PaymentSession, PaymentStatus,
};
pub use error::GatewayError;
pub use http::{HttpGatewayConfig, HttpPaymentGateway};
pub use mock::MockGateway;
pub use webhook::{WebhookEvent, WebhookEventType, sign_webhook, verify_signature};
