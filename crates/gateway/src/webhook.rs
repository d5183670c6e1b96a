//! Webhook payloads and signature verification.
//!
//! The gateway signs each webhook with
//! `base64(HMAC-SHA256(secret, timestamp || raw_body))` and sends the
//! timestamp and signature as headers. Verification must run against
//! the raw request bytes, before JSON parsing and before any state is
//! touched.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Verifies a webhook signature in constant time.
///
/// Returns false for a missing, undecodable, or mismatched signature;
/// the caller rejects with 401 before doing anything else.
pub fn verify_signature(raw_body: &[u8], timestamp: &str, signature: &str, secret: &str) -> bool {
    let Ok(provided) = BASE64.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(timestamp.as_bytes());
    mac.update(raw_body);
    // verify_slice is the constant-time comparison.
    mac.verify_slice(&provided).is_ok()
}

/// Produces the signature the gateway would send for a payload.
///
/// Counterpart of [`verify_signature`], used by tests and tooling.
pub fn sign_webhook(raw_body: &[u8], timestamp: &str, secret: &str) -> String {
    // HMAC accepts keys of any length, so this cannot fail.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return String::new();
    };
    mac.update(timestamp.as_bytes());
    mac.update(raw_body);
    BASE64.encode(mac.finalize().into_bytes())
}

/// Kind of a gateway webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum WebhookEventType {
    /// Payment captured.
    #[serde(rename = "PAYMENT_SUCCESS_WEBHOOK")]
    PaymentSuccess,
    /// Payment attempt failed.
    #[serde(rename = "PAYMENT_FAILED_WEBHOOK")]
    PaymentFailed,
    /// Customer abandoned the gateway page.
    #[serde(rename = "PAYMENT_USER_DROPPED_WEBHOOK")]
    PaymentUserDropped,
    /// Anything this adapter does not act on.
    #[serde(other)]
    Other,
}

/// A gateway webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: WebhookEventType,
    pub data: WebhookData,
}

/// Payload body: the order it concerns and the payment attempt, if any.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    pub order: WebhookOrder,
    #[serde(default)]
    pub payment: Option<WebhookPayment>,
}

/// Order reference inside a webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookOrder {
    pub order_id: String,
}

/// Payment reference inside a webhook payload.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayment {
    #[serde(default)]
    cf_payment_id: Option<serde_json::Value>,
}

impl WebhookPayment {
    /// The payment id as a string, whether the gateway sent a number
    /// or a string.
    pub fn payment_id(&self) -> Option<String> {
        match &self.cf_payment_id {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}
