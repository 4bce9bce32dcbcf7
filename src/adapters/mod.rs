//! # Backend Adapters
//!
//! One narrow interface per hosting backend. Every adapter decodes its
//! backend's native request into a [`Payload`], hands it to the shared
//! [`Dispatcher`], and encodes the outcome (success or [`FoundryError`]) into
//! the backend's native response.
//!
//! ```text
//! Request ──decode──▶ Payload ──invoke──▶ Prediction ──encode──▶ Response
//!            │                                            ▲
//!            └──────────── decode failure ────────────────┘
//! ```
//!
//! Health probes go through [`BackendAdapter::health`], which reads the
//! [`HealthReporter`] and never touches the dispatcher.

pub mod action;
pub mod batch;
pub mod functions;
pub mod rest;

pub use action::{ActionAdapter, ActionDescriptor, ActionRequest, ActionResponse};
pub use batch::{BatchAdapter, BatchOutput, BatchUnit, FailureRecord};
pub use functions::{FunctionRequest, FunctionsAdapter, InvocationRequest, InvocationResponse};
pub use rest::{ErrorEnvelope, RestAdapter, RestMode, RestRequest, RestResponse};

use crate::constants::AdapterKind;
use crate::dispatch::{Dispatcher, Payload, Prediction};
use crate::error::{FoundryError, Result};
use crate::health::{HealthReporter, HealthStatus};
use crate::logging::log_adapter_operation;
use async_trait::async_trait;
use std::sync::Arc;

/// Shared services every adapter is built on
#[derive(Debug, Clone)]
pub struct AdapterRuntime {
    dispatcher: Dispatcher,
    health: Arc<HealthReporter>,
}

impl AdapterRuntime {
    pub fn new(dispatcher: Dispatcher, health: Arc<HealthReporter>) -> Self {
        Self { dispatcher, health }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn health(&self) -> &Arc<HealthReporter> {
        &self.health
    }
}

/// Result of decoding a backend request.
///
/// The context is kept even when the payload could not be decoded, so the
/// failure response can still echo request details such as the action name.
#[derive(Debug)]
pub struct Decoded<C> {
    pub context: C,
    pub payload: Result<Payload>,
}

impl<C> Decoded<C> {
    pub fn ok(context: C, payload: Payload) -> Self {
        Self {
            context,
            payload: Ok(payload),
        }
    }

    pub fn rejected(context: C, error: FoundryError) -> Self {
        Self {
            context,
            payload: Err(error),
        }
    }
}

#[async_trait]
pub trait BackendAdapter: Send + Sync {
    type Request: Send + 'static;
    type Response: Send;
    type Context: Send;

    fn kind(&self) -> AdapterKind;

    fn runtime(&self) -> &AdapterRuntime;

    /// Translate a backend-native request into the dispatcher's input
    async fn decode(&self, request: Self::Request) -> Decoded<Self::Context>;

    /// Run the payload through the dispatcher
    async fn invoke(&self, payload: Payload) -> Result<Prediction> {
        self.runtime().dispatcher().predict(payload).await
    }

    /// Translate the dispatcher outcome into a backend-native response
    fn encode(&self, context: Self::Context, outcome: Result<Prediction>) -> Self::Response;

    /// Full request cycle. A decode failure skips the dispatcher.
    async fn handle(&self, request: Self::Request) -> Self::Response {
        let Decoded { context, payload } = self.decode(request).await;
        let outcome = match payload {
            Ok(payload) => self.invoke(payload).await,
            Err(error) => {
                log_adapter_operation(
                    self.kind().as_str(),
                    "decode",
                    "rejected",
                    Some(&error.to_string()),
                );
                Err(error)
            }
        };
        self.encode(context, outcome)
    }

    fn health(&self) -> HealthStatus {
        self.runtime().health().report(Some(self.kind()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::components::{Component, FnComponent};
    use crate::registry::{ComponentInfo, ComponentRegistry, HandlerResolver};
    use anyhow::bail;
    use serde_json::{json, Value};

    /// Runtime over the built-ins plus `tests.picky:predict`, which fails on
    /// inputs carrying a `bad` key
    pub(crate) fn runtime_for(reference: &str) -> AdapterRuntime {
        let mut registry = ComponentRegistry::with_builtin_components();
        registry
            .register_instance(
                "tests.picky:predict",
                ComponentInfo::described("fails on items marked bad"),
                Arc::new(FnComponent::new("picky", |input: Value| {
                    if input.get("bad").is_some() {
                        bail!("item marked bad");
                    }
                    Ok(json!({ "ok": input }))
                })) as Arc<dyn Component>,
            )
            .unwrap();

        let resolver = Arc::new(HandlerResolver::new(reference, Arc::new(registry)));
        AdapterRuntime::new(
            Dispatcher::new(Arc::clone(&resolver)),
            Arc::new(HealthReporter::new(resolver)),
        )
    }
}
