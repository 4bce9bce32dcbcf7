//! # Components
//!
//! A component is a single-purpose `predict(input) -> output` function. The
//! runtime serves exactly one component per process; which one is chosen by
//! the handler reference at startup.
//!
//! ## Usage
//!
//! ```rust
//! use anyhow::Result;
//! use async_trait::async_trait;
//! use foundry_runtime::components::Component;
//! use serde_json::{json, Value};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Component for Echo {
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//!
//!     async fn predict(&self, input: Value) -> Result<Value> {
//!         Ok(json!({ "echo": input }))
//!     }
//! }
//! ```
//!
//! The contract is always one logical record in, one logical record out. Batch
//! fan-out is the dispatcher's job, never the component's.

pub mod text_processor;
pub mod word_count;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub use text_processor::TextProcessor;
pub use word_count::WordCount;

/// A deployable predict function
///
/// Implementations must be safe to call from many in-flight requests at once;
/// a component holding mutable shared state guards it itself.
#[async_trait]
pub trait Component: Send + Sync + 'static {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Process one input record
    async fn predict(&self, input: Value) -> Result<Value>;
}

/// Per-process component settings, handed to built-in factories
pub type ComponentSettings = serde_json::Map<String, Value>;

type PredictFn = dyn Fn(Value) -> Result<Value> + Send + Sync;

/// Adapts a synchronous closure into a [`Component`]
pub struct FnComponent {
    name: String,
    predict: Box<PredictFn>,
}

impl FnComponent {
    pub fn new<F>(name: impl Into<String>, predict: F) -> Self
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predict: Box::new(predict),
        }
    }
}

impl fmt::Debug for FnComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComponent")
            .field("name", &self.name)
            .finish()
    }
}

#[async_trait]
impl Component for FnComponent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn predict(&self, input: Value) -> Result<Value> {
        (self.predict)(input)
    }
}

/// Extract the text field of a record, accepting a bare scalar as the text itself
pub(crate) fn text_of(input: &Value) -> String {
    match input {
        Value::Object(map) => match map.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
