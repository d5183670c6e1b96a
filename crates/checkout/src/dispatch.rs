//! Notification and fulfillment dispatch.
//!
//! These collaborators sit outside the transactional core: they run as
//! fire-and-forget tasks after materialization (or a status change)
//! commits, and their failures are logged and counted, never propagated
//! back into the checkout path.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;
use thiserror::Error;

/// Error from a notification or fulfillment collaborator.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DispatchError(pub String);

/// Outbound transactional email.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Sends the order confirmation after materialization.
    async fn order_confirmation(&self, order: &Order) -> Result<(), DispatchError>;

    /// Sends a shipping update when the order moves to shipped.
    async fn shipping_update(&self, order: &Order) -> Result<(), DispatchError>;
}

/// Shipping-provider integration.
#[async_trait]
pub trait FulfillmentService: Send + Sync {
    /// Registers a shipment for a freshly materialized order.
    async fn create_shipment(&self, order: &Order) -> Result<(), DispatchError>;
}

/// Notifier that only logs; stands in for the real email collaborator.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl EmailNotifier for LoggingNotifier {
    async fn order_confirmation(&self, order: &Order) -> Result<(), DispatchError> {
        tracing::info!(order_id = %order.id, email = %order.customer.email, "order confirmation email");
        Ok(())
    }

    async fn shipping_update(&self, order: &Order) -> Result<(), DispatchError> {
        tracing::info!(order_id = %order.id, email = %order.customer.email, "shipping update email");
        Ok(())
    }
}

/// Fulfillment service that only logs.
#[derive(Debug, Clone, Default)]
pub struct LoggingFulfillment;

#[async_trait]
impl FulfillmentService for LoggingFulfillment {
    async fn create_shipment(&self, order: &Order) -> Result<(), DispatchError> {
        tracing::info!(order_id = %order.id, "shipment requested");
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RecordingState {
    confirmations: Vec<OrderId>,
    shipping_updates: Vec<OrderId>,
    fail: bool,
}

/// Recording notifier for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    state: Arc<RwLock<RecordingState>>,
}

impl RecordingNotifier {
    /// Creates a new recording notifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the notifier to fail on every call.
    pub fn set_fail(&self, fail: bool) {
        self.state.write().unwrap().fail = fail;
    }

    /// Orders a confirmation email was sent for.
    pub fn confirmations(&self) -> Vec<OrderId> {
        self.state.read().unwrap().confirmations.clone()
    }

    /// Orders a shipping update was sent for.
    pub fn shipping_updates(&self) -> Vec<OrderId> {
        self.state.read().unwrap().shipping_updates.clone()
    }
}

#[async_trait]
impl EmailNotifier for RecordingNotifier {
    async fn order_confirmation(&self, order: &Order) -> Result<(), DispatchError> {
        let mut state = self.state.write().unwrap();
        if state.fail {
            return Err(DispatchError("email provider down".to_string()));
        }
        state.confirmations.push(order.id);
        Ok(())
    }

    async fn shipping_update(&self, order: &Order) -> Result<(), DispatchError> {
        let mut state = self.state.write().unwrap();
        if state.fail {
            return Err(DispatchError("email provider down".to_string()));
        }
        state.shipping_updates.push(order.id);
        Ok(())
    }
}

/// Recording fulfillment service for tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingFulfillment {
    shipments: Arc<RwLock<Vec<OrderId>>>,
    fail: Arc<RwLock<bool>>,
}

impl RecordingFulfillment {
    /// Creates a new recording fulfillment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail on every call.
    pub fn set_fail(&self, fail: bool) {
        *self.fail.write().unwrap() = fail;
    }

    /// Orders a shipment was created for.
    pub fn shipments(&self) -> Vec<OrderId> {
        self.shipments.read().unwrap().clone()
    }
}

#[async_trait]
impl FulfillmentService for RecordingFulfillment {
    async fn create_shipment(&self, order: &Order) -> Result<(), DispatchError> {
        if *self.fail.read().unwrap() {
            return Err(DispatchError("shipping provider down".to_string()));
        }
        self.shipments.write().unwrap().push(order.id);
        Ok(())
    }
}
