//! # Handler Resolver
//!
//! Resolves the process-wide handler reference to a component exactly once.
//!
//! The outcome (component or failure) lives in a single-assignment cell.
//! Concurrent first callers wait on the same initialisation instead of racing
//! separate factory runs, and every later caller reads the cached outcome. A
//! failed resolution is cached as well: recovering from it requires a process
//! restart.

use super::component_registry::{ComponentInfo, ComponentRegistry};
use super::handler_reference::HandlerReference;
use crate::components::Component;
use crate::error::{LoadFailure, ResolveError};
use crate::logging::{log_error, log_registry_operation};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// A resolved component together with the reference it was resolved from
#[derive(Clone)]
pub struct ResolvedHandler {
    reference: HandlerReference,
    component: Arc<dyn Component>,
}

impl ResolvedHandler {
    pub fn reference(&self) -> &HandlerReference {
        &self.reference
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    /// True when both handles point at the same component instance
    pub fn same_component(&self, other: &ResolvedHandler) -> bool {
        Arc::ptr_eq(&self.component, &other.component)
    }
}

impl fmt::Debug for ResolvedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedHandler")
            .field("reference", &self.reference.to_string())
            .field("component", &self.component.name())
            .finish()
    }
}

/// Resolution progress, readable without triggering resolution
#[derive(Debug, Clone)]
pub enum ResolutionState {
    Unresolved,
    Resolved(ResolvedHandler),
    Failed(ResolveError),
}

pub struct HandlerResolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    reference: String,
    registry: Arc<ComponentRegistry>,
    outcome: OnceCell<Result<ResolvedHandler, ResolveError>>,
}

impl fmt::Debug for HandlerResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerResolver")
            .field("reference", &self.inner.reference)
            .field("resolved", &self.inner.outcome.initialized())
            .finish()
    }
}

impl HandlerResolver {
    pub fn new(reference: impl Into<String>, registry: Arc<ComponentRegistry>) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                reference: reference.into(),
                registry,
                outcome: OnceCell::new(),
            }),
        }
    }

    /// The configured reference text, as supplied
    pub fn reference_text(&self) -> &str {
        &self.inner.reference
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.inner.registry
    }

    /// Resolve the configured reference, running the component factory at most
    /// once per resolver
    ///
    /// Initialisation runs in a detached task that fills the cell itself, so a
    /// caller dropped mid-resolution (request timeout, client disconnect)
    /// leaves the factory running to completion for the next caller.
    pub async fn resolve(&self) -> Result<ResolvedHandler, ResolveError> {
        if let Some(outcome) = self.inner.outcome.get() {
            return outcome.clone();
        }

        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            inner
                .outcome
                .get_or_init(|| inner.load())
                .await
                .clone()
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(join_error) => Err(ResolveError::handler_load(
                self.reference_text(),
                LoadFailure::FactoryPanicked {
                    message: join_error.to_string(),
                },
            )),
        }
    }

    /// Current resolution state; never resolves
    pub fn state(&self) -> ResolutionState {
        match self.inner.outcome.get() {
            None => ResolutionState::Unresolved,
            Some(Ok(handler)) => ResolutionState::Resolved(handler.clone()),
            Some(Err(error)) => ResolutionState::Failed(error.clone()),
        }
    }

    /// Check that the reference parses and names a registered component,
    /// without constructing it
    pub fn preflight(&self) -> Result<HandlerReference, ResolveError> {
        let reference = HandlerReference::parse(&self.inner.reference)?;
        self.inner
            .registry
            .lookup(&reference)
            .map_err(|failure| ResolveError::handler_load(self.reference_text(), failure))?;
        Ok(reference)
    }

    /// Registry metadata for the configured component; never resolves
    pub fn component_info(&self) -> Result<ComponentInfo, ResolveError> {
        let reference = HandlerReference::parse(&self.inner.reference)?;
        self.inner
            .registry
            .lookup(&reference)
            .map(|registration| registration.info.clone())
            .map_err(|failure| ResolveError::handler_load(self.reference_text(), failure))
    }
}

impl ResolverInner {
    async fn load(&self) -> Result<ResolvedHandler, ResolveError> {
        let started = Instant::now();
        debug!(reference = %self.reference, "Resolving handler");

        let outcome = self.load_inner().await;
        match &outcome {
            Ok(handler) => {
                log_registry_operation(
                    "resolve",
                    Some(handler.reference.module()),
                    Some(handler.reference.callable()),
                    "resolved",
                    Some(&format!("{}ms", started.elapsed().as_millis())),
                );
                info!(
                    reference = %handler.reference,
                    component = handler.component.name(),
                    "Handler resolved"
                );
            }
            Err(error) => {
                log_error("resolver", "resolve", &error.to_string(), Some(&self.reference));
            }
        }
        outcome
    }

    async fn load_inner(&self) -> Result<ResolvedHandler, ResolveError> {
        let reference = HandlerReference::parse(&self.reference)?;
        let factory = self
            .registry
            .lookup(&reference)
            .map_err(|failure| ResolveError::handler_load(&self.reference, failure))?
            .factory();

        // Component construction may do arbitrary blocking work
        let built = tokio::task::spawn_blocking(move || factory()).await;

        let component = match built {
            Ok(Ok(component)) => component,
            Ok(Err(error)) => {
                return Err(ResolveError::handler_load(
                    &self.reference,
                    LoadFailure::factory_failed(error),
                ))
            }
            Err(join_error) => {
                return Err(ResolveError::handler_load(
                    &self.reference,
                    LoadFailure::FactoryPanicked {
                        message: join_error.to_string(),
                    },
                ))
            }
        };

        Ok(ResolvedHandler {
            reference,
            component,
        })
    }
}
