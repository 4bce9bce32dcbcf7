//! # Component Registry
//!
//! Maps handler references to component factories. This is the lookup that
//! stands in for loading a callable by name: the module half of a reference
//! selects a group of registrations and the callable half selects one factory
//! within it.
//!
//! Factories are only run by the [`HandlerResolver`](super::HandlerResolver);
//! listing or describing registrations never constructs a component.

use super::handler_reference::HandlerReference;
use crate::components::{Component, ComponentSettings, TextProcessor, WordCount};
use crate::error::{LoadFailure, ResolveError};
use crate::logging::log_registry_operation;
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Builds the component instance for a registration
pub type ComponentFactory = Arc<dyn Fn() -> Result<Arc<dyn Component>> + Send + Sync>;

/// Documented contract of a component, available without constructing it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentInfo {
    pub description: String,
    pub input_schema: Value,
}

impl ComponentInfo {
    pub fn new(description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            description: description.into(),
            input_schema,
        }
    }

    /// Description with a permissive object schema
    pub fn described(description: impl Into<String>) -> Self {
        Self::new(
            description,
            json!({ "type": "object", "description": "Input data for prediction" }),
        )
    }
}

#[derive(Clone)]
pub struct ComponentRegistration {
    pub reference: HandlerReference,
    pub info: ComponentInfo,
    factory: ComponentFactory,
}

impl ComponentRegistration {
    pub fn factory(&self) -> ComponentFactory {
        Arc::clone(&self.factory)
    }
}

impl fmt::Debug for ComponentRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistration")
            .field("reference", &self.reference.to_string())
            .field("info", &self.info)
            .finish()
    }
}

#[derive(Default)]
pub struct ComponentRegistry {
    modules: HashMap<String, HashMap<String, ComponentRegistration>>,
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("component_count", &self.len())
            .field("references", &self.references())
            .finish()
    }
}

impl ComponentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in components registered
    pub fn with_builtin_components() -> Self {
        Self::with_component_settings(ComponentSettings::new())
    }

    /// Built-in components whose factories read `settings`
    ///
    /// Invalid settings surface when the component is resolved, not here.
    pub fn with_component_settings(settings: ComponentSettings) -> Self {
        let mut registry = Self::new();
        registry.register_builtin_components(Arc::new(settings));
        registry
    }

    fn register_builtin_components(&mut self, settings: Arc<ComponentSettings>) {
        let builtins: [(&str, ComponentInfo, ComponentFactory); 2] = [
            (
                "components.word_count:predict",
                ComponentInfo::new(
                    "Count words in the provided text",
                    json!({
                        "type": "object",
                        "properties": { "text": { "type": "string" } },
                        "required": ["text"]
                    }),
                ),
                Arc::new(|| Ok::<_, anyhow::Error>(Arc::new(WordCount::new()) as Arc<dyn Component>)),
            ),
            (
                "components.text_processor:predict",
                ComponentInfo::new(
                    "Count words and keep those within the configured length window",
                    json!({
                        "type": "object",
                        "properties": { "text": { "type": "string" } },
                        "required": ["text"]
                    }),
                ),
                Arc::new(move || {
                    let processor = TextProcessor::from_settings(&settings)?;
                    Ok::<_, anyhow::Error>(Arc::new(processor) as Arc<dyn Component>)
                }),
            ),
        ];

        for (reference, info, factory) in builtins {
            if let Err(e) = self.register_factory(reference, info, factory) {
                log_registry_operation("register", None, None, "failed", Some(&e.to_string()));
            }
        }
    }

    /// Register a factory under `reference`, replacing any previous registration
    pub fn register_factory(
        &mut self,
        reference: &str,
        info: ComponentInfo,
        factory: ComponentFactory,
    ) -> Result<(), ResolveError> {
        let reference = HandlerReference::parse(reference)?;

        let callables = self
            .modules
            .entry(reference.module().to_string())
            .or_default();
        let replaced = callables
            .insert(
                reference.callable().to_string(),
                ComponentRegistration {
                    reference: reference.clone(),
                    info,
                    factory,
                },
            )
            .is_some();

        if replaced {
            warn!(reference = %reference, "Replacing existing component registration");
        }
        log_registry_operation(
            "register",
            Some(reference.module()),
            Some(reference.callable()),
            if replaced { "replaced" } else { "registered" },
            None,
        );
        Ok(())
    }

    /// Register a factory closure
    pub fn register<F>(
        &mut self,
        reference: &str,
        info: ComponentInfo,
        factory: F,
    ) -> Result<(), ResolveError>
    where
        F: Fn() -> Result<Arc<dyn Component>> + Send + Sync + 'static,
    {
        self.register_factory(reference, info, Arc::new(factory))
    }

    /// Register an already-built component instance shared by every resolution
    pub fn register_instance(
        &mut self,
        reference: &str,
        info: ComponentInfo,
        component: Arc<dyn Component>,
    ) -> Result<(), ResolveError> {
        self.register(reference, info, move || Ok(Arc::clone(&component)))
    }

    /// Find the registration for a reference
    pub fn lookup(
        &self,
        reference: &HandlerReference,
    ) -> Result<&ComponentRegistration, LoadFailure> {
        let callables =
            self.modules
                .get(reference.module())
                .ok_or_else(|| LoadFailure::ModuleNotFound {
                    module: reference.module().to_string(),
                })?;

        callables
            .get(reference.callable())
            .ok_or_else(|| LoadFailure::CallableNotFound {
                module: reference.module().to_string(),
                callable: reference.callable().to_string(),
            })
    }

    pub fn contains(&self, reference: &HandlerReference) -> bool {
        self.lookup(reference).is_ok()
    }

    /// All registered references, sorted
    pub fn references(&self) -> Vec<String> {
        let mut references: Vec<String> = self
            .modules
            .values()
            .flat_map(|callables| callables.values())
            .map(|registration| registration.reference.to_string())
            .collect();
        references.sort();
        references
    }

    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
