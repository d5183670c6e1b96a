//! Checkout session and confirmation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use checkout::{CheckoutRequest, CheckoutService, LoggingFulfillment, LoggingNotifier};
use domain::{Address, CartLine, CustomerDetails, GatewayOrderId, Money, Order, UserId};
use gateway::PaymentGateway;
use serde::{Deserialize, Serialize};
use store::Store;

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S: Store, G: PaymentGateway> {
    pub service: CheckoutService<S, G, LoggingNotifier, LoggingFulfillment>,
    pub webhook_secret: String,
}

// -- Request types --

#[derive(Deserialize)]
pub struct CheckoutSessionRequest {
    pub customer: CustomerDetails,
    pub shipping_address: Address,
    pub lines: Vec<CartLine>,
}

#[derive(Deserialize)]
pub struct CheckoutConfirmRequest {
    pub order_id: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CheckoutSessionResponse {
    pub success: bool,
    pub payment_session_id: String,
    pub order_id: String,
    pub order_amount: Money,
}

#[derive(Serialize)]
pub struct OrderEnvelope {
    pub success: bool,
    pub order: Order,
}

/// Reads the authenticated user injected by the auth layer, if present.
pub(crate) fn user_id_from_headers(headers: &HeaderMap) -> Result<Option<UserId>, ApiError> {
    let Some(value) = headers.get("x-user-id") else {
        return Ok(None);
    };
    let uuid = value
        .to_str()
        .ok()
        .and_then(|s| uuid::Uuid::parse_str(s).ok())
        .ok_or_else(|| ApiError::BadRequest("Invalid x-user-id header".to_string()))?;
    Ok(Some(UserId::from_uuid(uuid)))
}

// -- Handlers --

/// POST /checkout-session — validate the cart, open a gateway payment
/// session, and store the pending reservation.
#[tracing::instrument(skip(state, headers, req))]
pub async fn session<S: Store, G: PaymentGateway + 'static>(
    State(state): State<Arc<AppState<S, G>>>,
    headers: HeaderMap,
    Json(req): Json<CheckoutSessionRequest>,
) -> Result<Json<CheckoutSessionResponse>, ApiError> {
    let user_id = user_id_from_headers(&headers)?;

    let session = state
        .service
        .open_session(CheckoutRequest {
            user_id,
            customer: req.customer,
            shipping_address: req.shipping_address,
            lines: req.lines,
        })
        .await?;

    Ok(Json(CheckoutSessionResponse {
        success: true,
        payment_session_id: session.session_token,
        order_id: session.gateway_order_id.to_string(),
        order_amount: session.amount,
    }))
}

/// POST /checkout-confirm — client-driven confirmation: verify payment
/// with the gateway and materialize the order.
#[tracing::instrument(skip(state, headers, req))]
pub async fn confirm<S: Store, G: PaymentGateway + 'static>(
    State(state): State<Arc<AppState<S, G>>>,
    headers: HeaderMap,
    Json(req): Json<CheckoutConfirmRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let user_id = user_id_from_headers(&headers)?;

    let order = state
        .service
        .confirm(&GatewayOrderId::new(req.order_id), user_id)
        .await?;

    Ok(Json(OrderEnvelope {
        success: true,
        order,
    }))
}
