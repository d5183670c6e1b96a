//! Order read and admin status endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::OrderId;
use domain::{Order, OrderStatus};
use gateway::PaymentGateway;
use serde::Deserialize;
use store::Store;

use crate::error::ApiError;
use crate::routes::checkout::{AppState, OrderEnvelope};

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    pub tracking_url: Option<String>,
}

/// GET /orders/:id — load an order by ID.
#[tracing::instrument(skip(state))]
pub async fn get<S: Store, G: PaymentGateway + 'static>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state
        .service
        .find_order(order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;

    Ok(Json(order))
}

/// POST /orders/:id/status — admin status transition, optionally
/// attaching a tracking URL when moving to shipped.
#[tracing::instrument(skip(state, req))]
pub async fn update_status<S: Store, G: PaymentGateway + 'static>(
    State(state): State<Arc<AppState<S, G>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<OrderEnvelope>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let status: OrderStatus = req
        .status
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown order status: {}", req.status)))?;

    let order = state
        .service
        .update_status(order_id, status, req.tracking_url)
        .await?;

    Ok(Json(OrderEnvelope {
        success: true,
        order,
    }))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order ID format: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
