//! HTTP API server with observability for the checkout service.
//!
//! Exposes the checkout endpoints, the gateway webhook, and order
//! reads/admin transitions, with structured logging (tracing) and
//! Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use gateway::PaymentGateway;
use metrics_exporter_prometheus::PrometheusHandle;
use store::Store;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: Store, G: PaymentGateway + 'static>(
    state: Arc<AppState<S, G>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/checkout-session", post(routes::checkout::session::<S, G>))
        .route("/checkout-confirm", post(routes::checkout::confirm::<S, G>))
        .route("/webhook", post(routes::webhook::receive::<S, G>))
        .route("/orders/{id}", get(routes::orders::get::<S, G>))
        .route(
            "/orders/{id}/status",
            post(routes::orders::update_status::<S, G>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
