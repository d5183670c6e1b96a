//! Durable order persistence.

use async_trait::async_trait;
use common::OrderId;
use domain::{GatewayOrderId, Order, OrderStatus};

use crate::error::Result;

/// Repository for materialized orders.
///
/// `insert` enforces a unique index on the gateway order id and
/// surfaces a violation as [`StoreError::DuplicateOrder`]; that
/// duplicate-key failure is what prevents double materialization when
/// the confirmation call and the webhook race for the same payment.
///
/// [`StoreError::DuplicateOrder`]: crate::StoreError::DuplicateOrder
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists a newly materialized order.
    async fn insert(&self, order: &Order) -> Result<()>;

    /// Fetches an order by its internal id.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>>;

    /// Fetches an order by the payment session that produced it.
    async fn find_by_gateway_order_id(&self, id: &GatewayOrderId) -> Result<Option<Order>>;

    /// Sets the order status (and optionally the tracking URL),
    /// returning the updated order. `None` if the order is unknown.
    /// Transition legality is the caller's responsibility.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        tracking_url: Option<String>,
    ) -> Result<Option<Order>>;

    /// Removes an order. Only used to compensate a failed
    /// materialization; orders are never deleted in normal operation.
    async fn delete_order(&self, id: OrderId) -> Result<()>;
}
