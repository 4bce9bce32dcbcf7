//! Shared state for the adapter routers.

use crate::adapters::{
    ActionAdapter, AdapterRuntime, BackendAdapter, BatchAdapter, FunctionsAdapter, RestAdapter,
};
use crate::config::RuntimeConfig;
use crate::constants::AdapterKind;
use crate::health::{HealthStatus, LivenessStatus};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct WebState {
    pub kind: AdapterKind,
    pub config: RuntimeConfig,
    pub runtime: AdapterRuntime,
    pub rest: RestAdapter,
    pub functions: FunctionsAdapter,
    pub batch: BatchAdapter,
    pub action: ActionAdapter,
}

impl WebState {
    pub fn new(config: RuntimeConfig, runtime: AdapterRuntime) -> Arc<Self> {
        Arc::new(Self {
            kind: config.adapter,
            rest: RestAdapter::new(runtime.clone()),
            functions: FunctionsAdapter::new(runtime.clone()),
            batch: BatchAdapter::new(runtime.clone()),
            action: ActionAdapter::new(runtime.clone()),
            runtime,
            config,
        })
    }

    /// Readiness as seen by the adapter this process serves
    pub fn health(&self) -> HealthStatus {
        match self.kind {
            AdapterKind::Rest => self.rest.health(),
            AdapterKind::Functions => self.functions.health(),
            AdapterKind::Batch => self.batch.health(),
            AdapterKind::Action => self.action.health(),
        }
    }

    pub fn liveness(&self) -> LivenessStatus {
        self.runtime.health().liveness()
    }
}
