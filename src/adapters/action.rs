//! # Action Adapter
//!
//! Structured tool calls from agent clients. A call names an action and
//! supplies an arguments object:
//!
//! ```json
//! {"action": "predict", "arguments": {"text": "a b c"}}
//! ```
//!
//! Each deployed component exposes exactly one action, `predict`, also
//! reachable as `process` and `execute`. Responses distinguish a declared
//! failure (the call itself was unusable) from an exception raised while
//! resolving or running the component.

use super::rest::{json_kind, parse_json_body};
use super::{AdapterRuntime, BackendAdapter, Decoded};
use crate::constants::{actions, system, AdapterKind};
use crate::dispatch::{Payload, Prediction};
use crate::error::{FoundryError, Result};
use crate::logging::log_adapter_operation;
use crate::registry::ComponentInfo;
use async_trait::async_trait;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, alias = "params")]
    pub arguments: Option<Value>,
}

impl ActionRequest {
    pub fn new(action: impl Into<String>, arguments: Value) -> Self {
        Self {
            action: Some(action.into()),
            arguments: Some(arguments),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionErrorKind {
    /// The call was malformed or named an unknown action
    Declared,
    /// Resolution or component execution failed
    Exception,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionError {
    pub kind: ActionErrorKind,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ActionError>,
}

impl ActionResponse {
    pub fn http_status(&self) -> StatusCode {
        match &self.error {
            None => StatusCode::OK,
            Some(error) if error.kind == ActionErrorKind::Declared => StatusCode::BAD_REQUEST,
            Some(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An action advertised to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDescriptor {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
    pub input_schema: Value,
}

fn is_known_action(name: &str) -> bool {
    name == actions::PREDICT || actions::ALIASES.contains(&name)
}

#[derive(Debug, Clone)]
pub struct ActionAdapter {
    runtime: AdapterRuntime,
}

impl ActionAdapter {
    pub fn new(runtime: AdapterRuntime) -> Self {
        Self { runtime }
    }

    /// Advertised actions, built from registry metadata without resolving
    pub fn list_actions(&self) -> Vec<ActionDescriptor> {
        let resolver = self.runtime.dispatcher().resolver();
        let info = resolver.component_info().unwrap_or_else(|_| {
            ComponentInfo::described(format!(
                "Run the configured component ({})",
                resolver.reference_text()
            ))
        });

        vec![ActionDescriptor {
            name: actions::PREDICT.to_string(),
            aliases: actions::ALIASES.iter().map(|alias| alias.to_string()).collect(),
            description: info.description,
            input_schema: info.input_schema,
        }]
    }

    /// Server description for tool discovery
    pub fn schema(&self) -> Value {
        json!({
            "name": actions::SERVER_NAME,
            "version": system::RUNTIME_VERSION,
            "description": "Component server exposing the configured handler as actions",
            "handler": self.runtime.dispatcher().resolver().reference_text(),
            "actions": self.list_actions(),
        })
    }

    /// Handle a raw JSON request body
    pub async fn handle_body(&self, body: &[u8]) -> ActionResponse {
        let request = parse_json_body(body).and_then(|value| {
            serde_json::from_value::<ActionRequest>(value)
                .map_err(|e| FoundryError::decode(format!("invalid action request: {e}")))
        });

        match request {
            Ok(request) => self.handle(request).await,
            Err(error) => self.encode(system::UNKNOWN.to_string(), Err(error)),
        }
    }
}

#[async_trait]
impl BackendAdapter for ActionAdapter {
    type Request = ActionRequest;
    type Response = ActionResponse;
    type Context = String;

    fn kind(&self) -> AdapterKind {
        AdapterKind::Action
    }

    fn runtime(&self) -> &AdapterRuntime {
        &self.runtime
    }

    async fn decode(&self, request: ActionRequest) -> Decoded<String> {
        let action = request
            .action
            .unwrap_or_else(|| actions::PREDICT.to_string());

        if !is_known_action(&action) {
            let error = FoundryError::UnknownAction {
                action: action.clone(),
            };
            return Decoded::rejected(action, error);
        }

        match request.arguments {
            None | Some(Value::Null) => Decoded::ok(action, Payload::Single(Map::new())),
            Some(Value::Object(arguments)) => Decoded::ok(action, Payload::Single(arguments)),
            Some(other) => {
                let error = FoundryError::decode(format!(
                    "arguments must be an object, got {}",
                    json_kind(&other)
                ));
                Decoded::rejected(action, error)
            }
        }
    }

    fn encode(&self, action: String, outcome: Result<Prediction>) -> ActionResponse {
        match outcome {
            Ok(prediction) => {
                log_adapter_operation(AdapterKind::Action.as_str(), &action, "completed", None);
                ActionResponse {
                    success: true,
                    action,
                    result: Some(prediction.into_value()),
                    error: None,
                }
            }
            Err(error) => {
                let kind = if error.is_client_fault() {
                    ActionErrorKind::Declared
                } else {
                    ActionErrorKind::Exception
                };
                log_adapter_operation(
                    AdapterKind::Action.as_str(),
                    &action,
                    "failed",
                    Some(error.error_code()),
                );
                ActionResponse {
                    success: false,
                    action,
                    result: None,
                    error: Some(ActionError {
                        kind,
                        code: error.error_code().to_string(),
                        message: error.to_string(),
                    }),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::runtime_for;
    use super::*;
    use crate::registry::ResolutionState;

    fn adapter(reference: &str) -> ActionAdapter {
        ActionAdapter::new(runtime_for(reference))
    }

    #[tokio::test]
    async fn test_predict_action() {
        let response = adapter("components.word_count:predict")
            .handle(ActionRequest::new("predict", json!({"text": "a b c"})))
            .await;

        assert!(response.success);
        assert_eq!(response.action, "predict");
        assert_eq!(response.result.unwrap()["word_count"], 3);
        assert_eq!(response.error, None);
    }

    #[tokio::test]
    async fn test_aliases_and_params_field() {
        let adapter = adapter("components.word_count:predict");
        let response = adapter
            .handle_body(br#"{"action": "process", "params": {"text": "one two"}}"#)
            .await;
        assert!(response.success);
        assert_eq!(response.action, "process");
        assert_eq!(response.result.unwrap()["word_count"], 2);

        let response = adapter.handle_body(br#"{"arguments": {"text": "x"}}"#).await;
        assert_eq!(response.action, "predict");
        assert!(response.success);
    }

    #[tokio::test]
    async fn test_unknown_action_is_declared_failure() {
        let response = adapter("components.word_count:predict")
            .handle(ActionRequest::new("summarize", json!({})))
            .await;

        assert!(!response.success);
        assert_eq!(response.http_status(), StatusCode::BAD_REQUEST);
        let error = response.error.unwrap();
        assert_eq!(error.kind, ActionErrorKind::Declared);
        assert_eq!(error.code, "UNKNOWN_ACTION");
    }

    #[tokio::test]
    async fn test_non_object_arguments_are_declared_failure() {
        let response = adapter("components.word_count:predict")
            .handle(ActionRequest::new("execute", json!([1, 2])))
            .await;

        let error = response.error.unwrap();
        assert_eq!(error.kind, ActionErrorKind::Declared);
        assert!(error.message.contains("array"));
    }

    #[tokio::test]
    async fn test_component_failure_is_exception() {
        let response = adapter("tests.picky:predict")
            .handle(ActionRequest::new("predict", json!({"bad": true})))
            .await;

        assert_eq!(response.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
        let error = response.error.unwrap();
        assert_eq!(error.kind, ActionErrorKind::Exception);
        assert_eq!(error.message, "item marked bad");
    }

    #[tokio::test]
    async fn test_unparsable_body_is_declared_failure() {
        let response = adapter("components.word_count:predict")
            .handle_body(b"not json")
            .await;
        assert_eq!(response.action, "unknown");
        assert_eq!(response.error.unwrap().kind, ActionErrorKind::Declared);
    }

    #[test]
    fn test_discovery_never_resolves() {
        let adapter = adapter("components.word_count:predict");
        let listed = adapter.list_actions();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].description, "Count words in the provided text");
        assert_eq!(listed[0].aliases, vec!["process", "execute"]);

        let schema = adapter.schema();
        assert_eq!(schema["name"], "component-server");
        assert_eq!(schema["actions"][0]["name"], "predict");
        assert!(matches!(
            adapter.runtime().dispatcher().resolver().state(),
            ResolutionState::Unresolved
        ));
    }

    #[test]
    fn test_discovery_with_misconfigured_handler() {
        let listed = adapter("nowhere").list_actions();
        assert!(listed[0].description.contains("nowhere"));
    }
}
