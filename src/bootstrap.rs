//! # Runtime Bootstrap
//!
//! Wires configuration, the component registry, the process-wide resolver,
//! the dispatcher and the health reporter into one [`FoundryRuntime`].
//!
//! With `eager_resolve` (the default) the handler is resolved before the
//! server binds, so a broken reference stops the process at start instead of
//! on the first request.

use crate::adapters::AdapterRuntime;
use crate::config::RuntimeConfig;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::health::{HealthReporter, WritableDirectory};
use crate::registry::{ComponentRegistry, HandlerResolver};
use crate::web::{self, WebState};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info};

#[derive(Debug, Clone)]
pub struct FoundryRuntime {
    config: RuntimeConfig,
    registry: Arc<ComponentRegistry>,
    resolver: Arc<HandlerResolver>,
    dispatcher: Dispatcher,
    health: Arc<HealthReporter>,
}

impl FoundryRuntime {
    pub fn new(config: RuntimeConfig, registry: ComponentRegistry) -> Self {
        let registry = Arc::new(registry);
        let resolver = Arc::new(HandlerResolver::new(
            config.handler.clone(),
            Arc::clone(&registry),
        ));
        let dispatcher = Dispatcher::new(Arc::clone(&resolver));
        let health = Arc::new(HealthReporter::new(Arc::clone(&resolver)));

        Self {
            config,
            registry,
            resolver,
            dispatcher,
            health,
        }
    }

    /// Runtime over the built-in components, configured from `config.component`
    pub fn with_builtin_components(config: RuntimeConfig) -> Self {
        let registry = ComponentRegistry::with_component_settings(config.component.clone());
        Self::new(config, registry)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ComponentRegistry> {
        &self.registry
    }

    pub fn resolver(&self) -> &Arc<HandlerResolver> {
        &self.resolver
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn health(&self) -> &Arc<HealthReporter> {
        &self.health
    }

    /// Probe the directory that will receive batch output at `output`
    pub fn register_output_check(&self, output: &Path) {
        let directory = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        self.health
            .register_check(Arc::new(WritableDirectory::new("batch_output", directory)));
    }

    pub fn adapter_runtime(&self) -> AdapterRuntime {
        AdapterRuntime::new(self.dispatcher.clone(), Arc::clone(&self.health))
    }

    /// Resolve the handler now when eager resolution is configured
    pub async fn start(&self) -> Result<()> {
        if !self.config.eager_resolve {
            info!(handler = %self.config.handler, "Lazy resolution; handler loads on first request");
            return Ok(());
        }

        let started = Instant::now();
        match self.dispatcher.warm_up().await {
            Ok(handler) => {
                info!(
                    handler = %handler.reference(),
                    component = handler.component().name(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Handler resolved at startup"
                );
                Ok(())
            }
            Err(e) => {
                error!(handler = %self.config.handler, error = %e, "Handler resolution failed at startup");
                Err(e)
            }
        }
    }

    pub fn web_state(&self) -> Arc<WebState> {
        WebState::new(self.config.clone(), self.adapter_runtime())
    }

    /// Start, bind the configured address and serve until `shutdown`
    pub async fn serve<F>(&self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.start().await?;
        let listener = TcpListener::bind(self.config.socket_addr()?).await?;
        info!(
            adapter = %self.config.adapter,
            handler = %self.config.handler,
            environment = %self.config.environment,
            "Serving"
        );
        web::serve(listener, self.web_state(), shutdown).await
    }
}
