//! Discovery and invocation endpoints of the action adapter.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::adapters::ActionResponse;
use crate::web::state::WebState;

/// GET /actions
pub async fn list_actions(State(state): State<Arc<WebState>>) -> Json<Value> {
    Json(json!({ "actions": state.action.list_actions() }))
}

/// GET /schema
pub async fn schema(State(state): State<Arc<WebState>>) -> Json<Value> {
    Json(state.action.schema())
}

/// POST /actions
pub async fn call_action(
    State(state): State<Arc<WebState>>,
    body: Bytes,
) -> (StatusCode, Json<ActionResponse>) {
    let response = state.action.handle_body(&body).await;
    (response.http_status(), Json(response))
}
