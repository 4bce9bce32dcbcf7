//! Online scoring endpoint of the batch adapter.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value;
use std::sync::Arc;

use crate::adapters::rest::{parse_json_body, status_for};
use crate::adapters::FailureRecord;
use crate::constants::AdapterKind;
use crate::logging::log_adapter_operation;
use crate::web::state::WebState;

/// POST /score
///
/// Failures are answered with the failure record and a 4xx/5xx status.
pub async fn score(State(state): State<Arc<WebState>>, body: Bytes) -> (StatusCode, Json<Value>) {
    let outcome = match parse_json_body(&body) {
        Ok(input) => state.batch.try_score(input).await,
        Err(error) => Err(error),
    };

    match outcome {
        Ok(scored) => {
            log_adapter_operation(AdapterKind::Batch.as_str(), "score", "completed", None);
            (StatusCode::OK, Json(scored))
        }
        Err(error) => {
            log_adapter_operation(
                AdapterKind::Batch.as_str(),
                "score",
                "failed",
                Some(error.error_code()),
            );
            (
                status_for(&error),
                Json(FailureRecord::from_error(&error).into_value()),
            )
        }
    }
}
