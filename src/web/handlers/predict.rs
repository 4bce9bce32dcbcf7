//! Synchronous prediction endpoints of the REST adapter.

use axum::body::Bytes;
use axum::extract::State;
use std::sync::Arc;

use crate::adapters::{BackendAdapter, RestRequest, RestResponse};
use crate::web::state::WebState;

/// POST /predict
pub async fn predict(State(state): State<Arc<WebState>>, body: Bytes) -> RestResponse {
    state.rest.handle(RestRequest::predict(body)).await
}

/// POST /batch
pub async fn batch(State(state): State<Arc<WebState>>, body: Bytes) -> RestResponse {
    state.rest.handle(RestRequest::batch(body)).await
}
