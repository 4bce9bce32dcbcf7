//! # Error Taxonomy
//!
//! Errors raised while resolving, invoking and adapting a component. Every
//! adapter maps these onto its backend's native failure shape and must keep
//! caller mistakes ([`FoundryError::is_client_fault`]) apart from system
//! failures.

use std::sync::Arc;
use thiserror::Error;

/// Why a well-formed handler reference could not be turned into a component
#[derive(Debug, Clone, Error)]
pub enum LoadFailure {
    #[error("no module named '{module}'")]
    ModuleNotFound { module: String },

    #[error("module '{module}' has no callable '{callable}'")]
    CallableNotFound { module: String, callable: String },

    #[error("component initialisation failed: {cause}")]
    FactoryFailed {
        #[source]
        cause: Arc<dyn std::error::Error + Send + Sync>,
    },

    #[error("component initialisation panicked: {message}")]
    FactoryPanicked { message: String },
}

impl LoadFailure {
    pub fn factory_failed(error: anyhow::Error) -> Self {
        let boxed: Box<dyn std::error::Error + Send + Sync> = error.into();
        Self::FactoryFailed {
            cause: Arc::from(boxed),
        }
    }
}

/// Outcome of a failed handler resolution. Cloneable so the resolver can hand
/// the same cached failure to every caller.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("malformed handler reference '{reference}': {reason}")]
    Configuration { reference: String, reason: String },

    #[error("failed to load handler '{reference}': {source}")]
    HandlerLoad {
        reference: String,
        #[source]
        source: LoadFailure,
    },
}

impl ResolveError {
    pub fn configuration(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn handler_load(reference: impl Into<String>, source: LoadFailure) -> Self {
        Self::HandlerLoad {
            reference: reference.into(),
            source,
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            ResolveError::Configuration { reference, .. }
            | ResolveError::HandlerLoad { reference, .. } => reference,
        }
    }
}

/// Errors surfaced to adapters
#[derive(Debug, Error)]
pub enum FoundryError {
    #[error("malformed handler reference '{reference}': {reason}")]
    Configuration { reference: String, reason: String },

    #[error("failed to load handler '{reference}': {source}")]
    HandlerLoad {
        reference: String,
        #[source]
        source: LoadFailure,
    },

    #[error("invalid request: {message}")]
    Decode { message: String },

    #[error("batch input must be a JSON array, got {found}")]
    BatchRequiresArray { found: &'static str },

    #[error("unknown action '{action}'")]
    UnknownAction { action: String },

    /// The component itself failed. Displays the component's own message
    /// untouched; `index` is set when the failing input was a batch item.
    #[error("{error}")]
    ComponentExecution {
        index: Option<usize>,
        error: anyhow::Error,
    },

    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FoundryError {
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn settings(message: impl Into<String>) -> Self {
        Self::Settings(config::ConfigError::Message(message.into()))
    }

    /// True when the caller sent something unusable; false for failures of
    /// the deployment or the component.
    pub fn is_client_fault(&self) -> bool {
        matches!(
            self,
            FoundryError::Decode { .. }
                | FoundryError::BatchRequiresArray { .. }
                | FoundryError::UnknownAction { .. }
        )
    }

    /// Stable machine-readable code used in every response envelope
    pub fn error_code(&self) -> &'static str {
        match self {
            FoundryError::Configuration { .. } => "CONFIGURATION_ERROR",
            FoundryError::HandlerLoad { .. } => "HANDLER_LOAD_ERROR",
            FoundryError::Decode { .. } => "DECODE_ERROR",
            FoundryError::BatchRequiresArray { .. } => "BATCH_REQUIRES_ARRAY",
            FoundryError::UnknownAction { .. } => "UNKNOWN_ACTION",
            FoundryError::ComponentExecution { .. } => "COMPONENT_EXECUTION_ERROR",
            FoundryError::Settings(_) => "SETTINGS_ERROR",
            FoundryError::Io(_) => "IO_ERROR",
        }
    }

    /// Position of the failing batch item, if any
    pub fn batch_index(&self) -> Option<usize> {
        match self {
            FoundryError::ComponentExecution { index, .. } => *index,
            _ => None,
        }
    }
}

impl From<ResolveError> for FoundryError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::Configuration { reference, reason } => {
                FoundryError::Configuration { reference, reason }
            }
            ResolveError::HandlerLoad { reference, source } => {
                FoundryError::HandlerLoad { reference, source }
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, FoundryError>;
