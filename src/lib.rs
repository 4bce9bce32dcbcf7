#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Foundry Runtime
//!
//! Serves one `predict(input) -> output` component from a single container
//! image to several hosting backends.
//!
//! ## Overview
//!
//! A process is configured with a handler reference (`<module>:<callable>`)
//! and an adapter. The reference selects a component from the
//! [`registry`]; the adapter selects the wire protocol spoken to the hosting
//! backend. Build once, deploy everywhere: nothing about the component is
//! known at build time.
//!
//! ## Architecture
//!
//! ```text
//! backend request
//!   → adapters::BackendAdapter::decode  → Payload
//!   → dispatch::Dispatcher::predict     → Prediction
//!   → adapters::BackendAdapter::encode  → backend response
//! ```
//!
//! ## Module Organization
//!
//! - [`components`] - the `Component` trait and built-in components
//! - [`registry`] - handler references, component registry, once-only resolver
//! - [`dispatch`] - payload normalisation and per-item fan-out
//! - [`health`] - readiness and liveness reporting
//! - [`adapters`] - `rest`, `functions`, `batch` and `action` backends
//! - [`web`] - axum server, routes and middleware
//! - [`bootstrap`] - wiring and eager resolution
//! - [`config`] / [`logging`] / [`error`] - ambient infrastructure
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use foundry_runtime::{FoundryRuntime, RuntimeConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RuntimeConfig::from_env()?;
//! let runtime = FoundryRuntime::with_builtin_components(config);
//! runtime.serve(foundry_runtime::web::shutdown_signal()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit and integration tests
//! ```

pub mod adapters;
pub mod bootstrap;
pub mod components;
pub mod config;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod health;
pub mod logging;
pub mod registry;
pub mod web;

pub use adapters::{
    ActionAdapter, AdapterRuntime, BackendAdapter, BatchAdapter, FunctionsAdapter, RestAdapter,
};
pub use bootstrap::FoundryRuntime;
pub use components::{Component, FnComponent, TextProcessor, WordCount};
pub use config::RuntimeConfig;
pub use constants::{AdapterKind, LogFormat};
pub use dispatch::{Dispatcher, Payload, Prediction};
pub use error::{FoundryError, LoadFailure, ResolveError, Result};
pub use health::{DependencyCheck, HealthReporter, HealthState, HealthStatus, WritableDirectory};
pub use registry::{ComponentInfo, ComponentRegistry, HandlerReference, HandlerResolver};
