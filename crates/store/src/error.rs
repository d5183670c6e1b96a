//! Store error types.

use domain::GatewayOrderId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unique-index violation on the order's gateway order id.
    ///
    /// This is the linearization point guaranteeing at-most-one order
    /// per payment session; callers treat it as "already materialized".
    #[error("An order already exists for gateway order {gateway_order_id}")]
    DuplicateOrder { gateway_order_id: GatewayOrderId },
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
