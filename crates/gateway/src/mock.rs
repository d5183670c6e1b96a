//! In-memory mock gateway for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use domain::{GatewayOrderId, Money};

use crate::client::{
    CreateSessionRequest, PaymentAttempt, PaymentGateway, PaymentSession, PaymentStatus,
};
use crate::error::GatewayError;

#[derive(Debug, Default)]
struct MockState {
    sessions: HashMap<String, Money>,
    payments: HashMap<String, Vec<PaymentAttempt>>,
    next_id: u32,
    fail_on_create: bool,
}

/// Scriptable in-memory payment gateway for tests.
#[derive(Debug, Clone, Default)]
pub struct MockGateway {
    state: Arc<RwLock<MockState>>,
}

impl MockGateway {
    /// Creates a new mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the gateway to fail on the next create call.
    pub fn set_fail_on_create(&self, fail: bool) {
        self.state.write().unwrap().fail_on_create = fail;
    }

    /// Scripts the latest payment attempt for an order.
    ///
    /// Returns the payment id assigned to the attempt.
    pub fn push_payment(&self, order_id: &GatewayOrderId, status: PaymentStatus) -> String {
        let mut state = self.state.write().unwrap();
        state.next_id += 1;
        let payment_id = format!("cf_{:04}", state.next_id);

        let attempts = state
            .payments
            .entry(order_id.as_str().to_string())
            .or_default();
        // Most recent first, like the live gateway.
        attempts.insert(
            0,
            PaymentAttempt {
                payment_id: payment_id.clone(),
                status,
            },
        );
        payment_id
    }

    /// Returns the number of sessions opened so far.
    pub fn session_count(&self) -> usize {
        self.state.read().unwrap().sessions.len()
    }

    /// Returns the amount the session for an order was opened with.
    pub fn session_amount(&self, order_id: &GatewayOrderId) -> Option<Money> {
        self.state
            .read()
            .unwrap()
            .sessions
            .get(order_id.as_str())
            .copied()
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<PaymentSession, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_create {
            return Err(GatewayError::Api {
                status: 502,
                message: "gateway unavailable".to_string(),
            });
        }

        state.next_id += 1;
        let session_token = format!("session_{:04}", state.next_id);
        state
            .sessions
            .insert(request.gateway_order_id.as_str().to_string(), request.amount);

        Ok(PaymentSession { session_token })
    }

    async fn fetch_payments(
        &self,
        order_id: &GatewayOrderId,
    ) -> Result<Vec<PaymentAttempt>, GatewayError> {
        Ok(self
            .state
            .read()
            .unwrap()
            .payments
            .get(order_id.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
