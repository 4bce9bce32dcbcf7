//! Custom-handler invocation endpoint of the functions adapter.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use std::sync::Arc;

use crate::adapters::rest::parse_json_body;
use crate::adapters::{BackendAdapter, FunctionRequest, InvocationRequest, InvocationResponse};
use crate::error::FoundryError;
use crate::web::response_types::ApiResult;
use crate::web::state::WebState;

/// POST /{function}
///
/// A malformed invocation envelope is a host-level protocol error and is
/// answered directly with 400; failures inside the envelope are reported in
/// `Outputs.res`.
pub async fn invoke(
    State(state): State<Arc<WebState>>,
    Path(function): Path<String>,
    body: Bytes,
) -> ApiResult<Json<InvocationResponse>> {
    let invocation = if body.iter().all(u8::is_ascii_whitespace) {
        InvocationRequest::default()
    } else {
        let value = parse_json_body(&body)?;
        serde_json::from_value(value)
            .map_err(|e| FoundryError::decode(format!("invalid invocation envelope: {e}")))?
    };

    let response = state
        .functions
        .handle(FunctionRequest {
            function,
            invocation,
        })
        .await;
    Ok(Json(response))
}
