//! Inbound payment gateway webhook.
//!
//! Signature verification runs against the raw body before anything is
//! parsed. After that gate the handler always acknowledges with 200:
//! the gateway retry-storms any non-2xx response, and a handler that
//! succeeded internally but failed to format a body must not look like
//! a failure to the gateway. Internal errors are logged and counted
//! instead.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use gateway::{PaymentGateway, WebhookEvent, verify_signature};
use store::Store;

use crate::routes::checkout::AppState;

const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";
const SIGNATURE_HEADER: &str = "x-webhook-signature";

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
}

fn acknowledge() -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true })),
    )
        .into_response()
}

/// POST /webhook — gateway-initiated payment event.
#[tracing::instrument(skip(state, headers, body))]
pub async fn receive<S: Store, G: PaymentGateway + 'static>(
    State(state): State<Arc<AppState<S, G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let timestamp = header_str(&headers, TIMESTAMP_HEADER);
    let signature = header_str(&headers, SIGNATURE_HEADER);

    if !verify_signature(&body, timestamp, signature, &state.webhook_secret) {
        metrics::counter!("webhook_rejected_total").increment(1);
        tracing::warn!("webhook rejected: signature verification failed");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            metrics::counter!("webhook_processing_failures_total").increment(1);
            tracing::error!(error = %e, "webhook payload failed to parse");
            return acknowledge();
        }
    };

    if let Err(e) = state.service.handle_webhook(&event).await {
        metrics::counter!("webhook_processing_failures_total").increment(1);
        tracing::error!(
            order_id = %event.data.order.order_id,
            error = %e,
            "webhook processing failed"
        );
    }

    acknowledge()
}
