//! # Routes
//!
//! One router per adapter; every router carries the health probes.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::constants::AdapterKind;
use crate::web::{handlers, state::WebState};

/// Probe routes shared by every adapter
pub fn health_routes() -> Router<Arc<WebState>> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/ready", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness_check))
}

/// Web container: POST /predict, POST /batch
pub fn rest_routes() -> Router<Arc<WebState>> {
    Router::new()
        .route("/predict", post(handlers::predict::predict))
        .route("/batch", post(handlers::predict::batch))
}

/// Functions host: POST /{function}
pub fn functions_routes() -> Router<Arc<WebState>> {
    Router::new().route("/{function}", post(handlers::functions::invoke))
}

/// Managed endpoints: POST /score, GET / as a liveness check
pub fn batch_routes() -> Router<Arc<WebState>> {
    Router::new()
        .route("/", get(handlers::health::liveness_check))
        .route("/score", post(handlers::batch::score))
}

/// Tool clients: GET/POST /actions, GET /schema
pub fn action_routes() -> Router<Arc<WebState>> {
    Router::new()
        .route(
            "/actions",
            get(handlers::actions::list_actions).post(handlers::actions::call_action),
        )
        .route("/schema", get(handlers::actions::schema))
}

pub fn adapter_routes(kind: AdapterKind) -> Router<Arc<WebState>> {
    let routes = match kind {
        AdapterKind::Rest => rest_routes(),
        AdapterKind::Functions => functions_routes(),
        AdapterKind::Batch => batch_routes(),
        AdapterKind::Action => action_routes(),
    };
    health_routes().merge(routes)
}
