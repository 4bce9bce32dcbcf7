//! # Health Check Handlers
//!
//! Probe endpoints shared by every adapter. None of them resolve the handler
//! or run the component.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use std::sync::Arc;

use crate::health::{HealthStatus, LivenessStatus};
use crate::web::state::WebState;

/// Readiness: GET /health and GET /health/ready
///
/// Always returns the full status body; the HTTP status is 200 only when the
/// adapter is ready to serve.
pub async fn health_check(State(state): State<Arc<WebState>>) -> (StatusCode, Json<HealthStatus>) {
    let status = state.health();
    let code = if status.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(status))
}

/// Liveness: GET /health/live
pub async fn liveness_check(State(state): State<Arc<WebState>>) -> Json<LivenessStatus> {
    Json(state.liveness())
}
