//! # Functions Adapter
//!
//! Serverless functions hosts forward each HTTP trigger to a custom handler
//! as an invocation envelope posted to `/{function}`:
//!
//! ```json
//! {"Data": {"req": {"Method": "POST", "Url": "...", "Headers": {}, "Query": {}, "Body": "{\"text\": \"a b\"}"}},
//!  "Metadata": {}}
//! ```
//!
//! The reply wraps the HTTP output binding:
//!
//! ```json
//! {"Outputs": {"res": {"statusCode": 200, "body": {...}, "headers": {...}}}, "Logs": [], "ReturnValue": null}
//! ```
//!
//! The host relays `statusCode` to the caller, so the envelope itself is
//! always delivered with HTTP 200.

use super::batch::FailureRecord;
use super::rest::status_for;
use super::{AdapterRuntime, BackendAdapter, Decoded};
use crate::constants::AdapterKind;
use crate::dispatch::{Payload, Prediction};
use crate::error::{FoundryError, Result};
use crate::logging::log_adapter_operation;
use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// HTTP trigger as forwarded by the host
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HttpTrigger {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, Value>,
    #[serde(default)]
    pub query: BTreeMap<String, Value>,
    #[serde(default)]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationData {
    #[serde(default)]
    pub req: Option<HttpTrigger>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationRequest {
    #[serde(default)]
    pub data: InvocationData,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpOutput {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: Value,
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationOutputs {
    pub res: HttpOutput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationResponse {
    pub outputs: InvocationOutputs,
    pub logs: Vec<String>,
    pub return_value: Value,
}

impl InvocationResponse {
    fn new(status: StatusCode, body: Value, logs: Vec<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self {
            outputs: InvocationOutputs {
                res: HttpOutput {
                    status_code: status.as_u16(),
                    body,
                    headers,
                },
            },
            logs,
            return_value: Value::Null,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.outputs.res.status_code
    }

    pub fn body(&self) -> &Value {
        &self.outputs.res.body
    }
}

#[derive(Debug, Clone)]
pub struct FunctionRequest {
    pub function: String,
    pub invocation: InvocationRequest,
}

#[derive(Debug)]
pub struct InvocationContext {
    function: String,
    logs: Vec<String>,
}

/// Missing or blank bodies are an empty record; string bodies hold JSON text
fn decode_body(body: Option<Value>) -> Result<Payload> {
    match body {
        None | Some(Value::Null) => Ok(Payload::Single(Map::new())),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(Payload::Single(Map::new())),
        Some(Value::String(text)) => serde_json::from_str::<Value>(&text)
            .map(Payload::from)
            .map_err(|e| FoundryError::decode(format!("request body is not valid JSON: {e}"))),
        Some(value) => Ok(Payload::from(value)),
    }
}

#[derive(Debug, Clone)]
pub struct FunctionsAdapter {
    runtime: AdapterRuntime,
}

impl FunctionsAdapter {
    pub fn new(runtime: AdapterRuntime) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl BackendAdapter for FunctionsAdapter {
    type Request = FunctionRequest;
    type Response = InvocationResponse;
    type Context = InvocationContext;

    fn kind(&self) -> AdapterKind {
        AdapterKind::Functions
    }

    fn runtime(&self) -> &AdapterRuntime {
        &self.runtime
    }

    async fn decode(&self, request: FunctionRequest) -> Decoded<InvocationContext> {
        let trigger = request.invocation.data.req.unwrap_or_default();
        let mut context = InvocationContext {
            function: request.function,
            logs: Vec::new(),
        };

        match decode_body(trigger.body) {
            Ok(payload) => {
                context.logs.push(format!(
                    "{} {} received a {} payload",
                    trigger.method,
                    context.function,
                    payload.kind()
                ));
                Decoded::ok(context, payload)
            }
            Err(error) => {
                context.logs.push(format!("{} rejected: {error}", context.function));
                Decoded::rejected(context, error)
            }
        }
    }

    fn encode(&self, mut context: InvocationContext, outcome: Result<Prediction>) -> InvocationResponse {
        match outcome {
            Ok(prediction) => {
                log_adapter_operation(
                    AdapterKind::Functions.as_str(),
                    &context.function,
                    "completed",
                    None,
                );
                InvocationResponse::new(StatusCode::OK, prediction.into_value(), context.logs)
            }
            Err(error) => {
                log_adapter_operation(
                    AdapterKind::Functions.as_str(),
                    &context.function,
                    "failed",
                    Some(error.error_code()),
                );
                context.logs.push(format!("{} failed: {error}", context.function));
                InvocationResponse::new(
                    status_for(&error),
                    FailureRecord::from_error(&error).into_value(),
                    context.logs,
                )
            }
        }
    }
}
