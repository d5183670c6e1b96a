//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout workflow error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "success": false, "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        CheckoutError::Validation(_)
        | CheckoutError::SessionExpired
        | CheckoutError::PaymentNotCompleted { .. } => StatusCode::BAD_REQUEST,
        CheckoutError::ProductNotFound(_) | CheckoutError::OrderNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        CheckoutError::InsufficientStock { .. }
        | CheckoutError::StockConflict { .. }
        | CheckoutError::InvalidTransition { .. } => StatusCode::CONFLICT,
        CheckoutError::Forbidden => StatusCode::FORBIDDEN,
        CheckoutError::Gateway(_) => {
            tracing::error!(error = %err, "payment gateway failure");
            StatusCode::BAD_GATEWAY
        }
        CheckoutError::Store(_) => {
            tracing::error!(error = %err, "store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
