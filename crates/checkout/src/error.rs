//! Checkout error taxonomy.

use common::OrderId;
use domain::{OrderStatus, ProductId};
use gateway::{GatewayError, PaymentStatus};
use store::StoreError;
use thiserror::Error;

/// Errors that can occur during the checkout workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Bad input from the client.
    #[error("Invalid checkout request: {0}")]
    Validation(String),

    /// A cart line references a product the catalog does not know.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Advisory stock check failed at reservation time.
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: u32,
        available: u32,
    },

    /// Authoritative stock check failed at materialization time.
    /// Already-applied decrements were reversed; the caller should
    /// adjust the cart and start a fresh checkout.
    #[error("Stock for {product_id} ran out while the payment completed")]
    StockConflict { product_id: ProductId },

    /// The reservation belongs to a different authenticated user.
    #[error("This payment session belongs to a different user")]
    Forbidden,

    /// The reservation expired or was already consumed.
    #[error("Checkout session expired, start a new checkout")]
    SessionExpired,

    /// The gateway does not (yet) report a successful payment.
    /// The reservation is left in place so the caller can retry.
    #[error("Payment not completed (latest status: {status:?})")]
    PaymentNotCompleted { status: Option<PaymentStatus> },

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Illegal order status transition.
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Payment gateway failure.
    #[error("Payment gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Persistence failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience type alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;
