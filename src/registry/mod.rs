//! # Handler Registry and Resolution
//!
//! Turns the textual handler reference configured for a process into a
//! callable component.
//!
//! ## Architecture
//!
//! ```text
//! Handler Resolution
//! ├── HandlerReference    (`<module>:<callable>` parsing)
//! ├── ComponentRegistry   (reference → factory + metadata)
//! └── HandlerResolver     (once-only, concurrency-safe resolution)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use foundry_runtime::registry::{ComponentRegistry, HandlerResolver};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(ComponentRegistry::with_builtin_components());
//! let resolver = HandlerResolver::new("components.word_count:predict", registry);
//!
//! let handler = resolver.resolve().await?;
//! let output = handler.component().predict(serde_json::json!({"text": "a b c"})).await?;
//! assert_eq!(output["word_count"], 3);
//! # Ok(())
//! # }
//! ```

pub mod component_registry;
pub mod handler_reference;
pub mod resolver;

pub use component_registry::{
    ComponentFactory, ComponentInfo, ComponentRegistration, ComponentRegistry,
};
pub use handler_reference::HandlerReference;
pub use resolver::{HandlerResolver, ResolutionState, ResolvedHandler};
