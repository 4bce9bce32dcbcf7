//! # REST Adapter
//!
//! Synchronous JSON over HTTP for generic web containers. `POST /predict`
//! accepts any JSON value; `POST /batch` requires an array.
//!
//! Failures use one envelope:
//!
//! ```json
//! {"error": {"code": "COMPONENT_EXECUTION_ERROR", "message": "...", "index": 1}, "status": "failed"}
//! ```
//!
//! Client faults answer 400, everything else 500.

use super::{AdapterRuntime, BackendAdapter, Decoded};
use crate::constants::{system, AdapterKind};
use crate::dispatch::{Payload, Prediction};
use crate::error::{FoundryError, Result};
use crate::logging::log_adapter_operation;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which endpoint received the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestMode {
    /// Any payload shape, output mirrors the input
    Predict,
    /// Array payloads only
    Batch,
}

#[derive(Debug, Clone)]
pub struct RestRequest {
    pub mode: RestMode,
    pub body: Bytes,
}

impl RestRequest {
    pub fn predict(body: impl Into<Bytes>) -> Self {
        Self {
            mode: RestMode::Predict,
            body: body.into(),
        }
    }

    pub fn batch(body: impl Into<Bytes>) -> Self {
        Self {
            mode: RestMode::Batch,
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

/// JSON error body shared by the HTTP surfaces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
    pub status: String,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>, index: Option<usize>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                index,
            },
            status: system::FAILED_STATUS.to_string(),
        }
    }

    pub fn from_error(error: &FoundryError) -> Self {
        Self::new(error.error_code(), error.to_string(), error.batch_index())
    }
}

/// HTTP status for a failure: 400 for caller mistakes, 500 otherwise
pub fn status_for(error: &FoundryError) -> StatusCode {
    if error.is_client_fault() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl RestResponse {
    pub fn failure(error: &FoundryError) -> Self {
        Self {
            status: status_for(error),
            body: serde_json::to_value(ErrorEnvelope::from_error(error)).unwrap_or(Value::Null),
        }
    }
}

impl IntoResponse for RestResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Parse a JSON request body, mapping failures to a client fault
pub(crate) fn parse_json_body(body: &[u8]) -> Result<Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(FoundryError::decode("request body is empty"));
    }
    serde_json::from_slice(body)
        .map_err(|e| FoundryError::decode(format!("request body is not valid JSON: {e}")))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[derive(Debug, Clone)]
pub struct RestAdapter {
    runtime: AdapterRuntime,
}

impl RestAdapter {
    pub fn new(runtime: AdapterRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl BackendAdapter for RestAdapter {
    type Request = RestRequest;
    type Response = RestResponse;
    type Context = RestMode;

    fn kind(&self) -> AdapterKind {
        AdapterKind::Rest
    }

    fn runtime(&self) -> &AdapterRuntime {
        &self.runtime
    }

    async fn decode(&self, request: RestRequest) -> Decoded<RestMode> {
        let value = match parse_json_body(&request.body) {
            Ok(value) => value,
            Err(error) => return Decoded::rejected(request.mode, error),
        };

        match (request.mode, value) {
            (RestMode::Batch, Value::Array(items)) => Decoded::ok(request.mode, Payload::Batch(items)),
            (RestMode::Batch, other) => Decoded::rejected(
                request.mode,
                FoundryError::BatchRequiresArray {
                    found: json_kind(&other),
                },
            ),
            (RestMode::Predict, value) => Decoded::ok(request.mode, Payload::from(value)),
        }
    }

    fn encode(&self, mode: RestMode, outcome: Result<Prediction>) -> RestResponse {
        let operation = match mode {
            RestMode::Predict => "predict",
            RestMode::Batch => "batch",
        };
        match outcome {
            Ok(prediction) => {
                log_adapter_operation(AdapterKind::Rest.as_str(), operation, "completed", None);
                RestResponse {
                    status: StatusCode::OK,
                    body: prediction.into_value(),
                }
            }
            Err(error) => {
                log_adapter_operation(
                    AdapterKind::Rest.as_str(),
                    operation,
                    "failed",
                    Some(error.error_code()),
                );
                RestResponse::failure(&error)
            }
        }
    }
}
