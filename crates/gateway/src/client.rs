//! Gateway client trait and wire-adjacent types.

use async_trait::async_trait;
use domain::{CustomerDetails, GatewayOrderId, Money};
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Status of a single payment attempt as reported by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Payment captured; the only status that permits materialization.
    Success,
    /// Payment attempt failed.
    Failed,
    /// Attempt still in flight.
    Pending,
    /// Customer abandoned the gateway checkout page.
    UserDropped,
    /// Any status this adapter does not recognize.
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    /// Returns true only for a captured payment.
    pub fn is_success(&self) -> bool {
        matches!(self, PaymentStatus::Success)
    }
}

/// One payment attempt against a gateway order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAttempt {
    /// The gateway's id for this payment attempt.
    pub payment_id: String,
    /// Outcome of the attempt.
    pub status: PaymentStatus,
}

/// Input for opening a gateway payment session.
#[derive(Debug, Clone)]
pub struct CreateSessionRequest {
    /// Our chosen gateway order id; the reservation is keyed by it.
    pub gateway_order_id: GatewayOrderId,
    /// The frozen checkout total.
    pub amount: Money,
    /// ISO currency code, e.g. `"INR"`.
    pub currency: String,
    /// Customer contact details forwarded to the gateway.
    pub customer: CustomerDetails,
    /// Where the gateway sends the customer after payment.
    pub return_url: String,
    /// Webhook endpoint the gateway should notify, if configured.
    pub notify_url: Option<String>,
}

/// A successfully opened payment session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Token the client uses to drive the gateway's payment page.
    pub session_token: String,
}

/// External payment gateway operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment session for the given order and amount.
    ///
    /// Any failure means the caller must not write a reservation.
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<PaymentSession, GatewayError>;

    /// Fetches all payment attempts for an order, most recent first.
    async fn fetch_payments(
        &self,
        order_id: &GatewayOrderId,
    ) -> Result<Vec<PaymentAttempt>, GatewayError>;
}
