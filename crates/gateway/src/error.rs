//! Gateway error types.

use thiserror::Error;

/// Errors that can occur when talking to the payment gateway.
///
/// All variants are fail-closed for the caller: no reservation is
/// written after a failed session creation, and a failed status fetch
/// leaves materialization state untouched.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connect, timeout, TLS).
    #[error("Gateway transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway answered with a 4xx/5xx status.
    #[error("Gateway rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    /// The gateway answered 2xx with a body we could not interpret.
    #[error("Unexpected gateway response: {0}")]
    InvalidResponse(String),
}
