//! # Health Reporting
//!
//! Liveness and readiness for hosting-backend probes.
//!
//! Reports are recomputed on every probe from the resolver's current state
//! and the registered dependency checks. A probe never resolves the handler
//! and never runs the component, so a misconfigured process still answers
//! with a `degraded` status instead of failing the probe itself.
//!
//! | resolver state | checks | status |
//! |---|---|---|
//! | resolved | all pass | `healthy` |
//! | unresolved, reference valid | all pass | `starting` |
//! | failed, or reference invalid | any | `degraded` |
//! | any | one fails | `degraded` |

use crate::constants::{system, AdapterKind};
use crate::registry::{HandlerReference, HandlerResolver, ResolutionState};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Probe-facing service state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// Handler resolved and every dependency check passes
    Healthy,
    /// Handler not yet resolved (lazy resolution) but nothing is known to be wrong
    Starting,
    /// The process cannot serve requests
    Degraded,
}

impl HealthState {
    pub fn is_ready(&self) -> bool {
        matches!(self, HealthState::Healthy)
    }
}

/// Result of one dependency check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: HealthState,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter: Option<AdapterKind>,
    pub handler: String,
    pub module: String,
    pub function: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub checks: BTreeMap<String, CheckOutcome>,
    pub timestamp: DateTime<Utc>,
}

/// Process liveness; reported whenever the process can answer at all
#[derive(Debug, Clone, Serialize)]
pub struct LivenessStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// External dependency probed by readiness checks
pub trait DependencyCheck: Send + Sync {
    fn name(&self) -> &str;

    /// Must be cheap and must not invoke the component
    fn check(&self) -> Result<(), String>;
}

/// Passes while `path` is an existing directory that is not read-only
///
/// The batch entry point registers one for its output location so a run
/// fails before scoring anything it could not write.
#[derive(Debug, Clone)]
pub struct WritableDirectory {
    name: String,
    path: PathBuf,
}

impl WritableDirectory {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

impl DependencyCheck for WritableDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self) -> Result<(), String> {
        let metadata = std::fs::metadata(&self.path)
            .map_err(|e| format!("{}: {e}", self.path.display()))?;
        if !metadata.is_dir() {
            return Err(format!("{} is not a directory", self.path.display()));
        }
        if metadata.permissions().readonly() {
            return Err(format!("{} is read-only", self.path.display()));
        }
        Ok(())
    }
}

pub struct HealthReporter {
    resolver: Arc<HandlerResolver>,
    checks: RwLock<Vec<Arc<dyn DependencyCheck>>>,
}

impl fmt::Debug for HealthReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthReporter")
            .field("reference", &self.resolver.reference_text())
            .field("check_count", &self.checks.read().len())
            .finish()
    }
}

impl HealthReporter {
    pub fn new(resolver: Arc<HandlerResolver>) -> Self {
        Self {
            resolver,
            checks: RwLock::new(Vec::new()),
        }
    }

    pub fn register_check(&self, check: Arc<dyn DependencyCheck>) {
        self.checks.write().push(check);
    }

    pub fn liveness(&self) -> LivenessStatus {
        LivenessStatus {
            status: "alive",
            version: system::RUNTIME_VERSION,
            timestamp: Utc::now(),
        }
    }

    /// Readiness report for `adapter`
    pub fn report(&self, adapter: Option<AdapterKind>) -> HealthStatus {
        let reference_text = self.resolver.reference_text().to_string();
        let (module, function) = match HandlerReference::parse(&reference_text) {
            Ok(reference) => (
                reference.module().to_string(),
                reference.callable().to_string(),
            ),
            Err(_) => (system::UNKNOWN.to_string(), system::UNKNOWN.to_string()),
        };

        let (mut status, mut reason) = match self.resolver.state() {
            ResolutionState::Resolved(_) => (HealthState::Healthy, None),
            ResolutionState::Failed(error) => (HealthState::Degraded, Some(error.to_string())),
            ResolutionState::Unresolved => match self.resolver.preflight() {
                Ok(_) => (HealthState::Starting, None),
                Err(error) => (HealthState::Degraded, Some(error.to_string())),
            },
        };

        let checks: BTreeMap<String, CheckOutcome> = self
            .checks
            .read()
            .iter()
            .map(|check| {
                let outcome = match check.check() {
                    Ok(()) => CheckOutcome {
                        healthy: true,
                        message: None,
                    },
                    Err(message) => CheckOutcome {
                        healthy: false,
                        message: Some(message),
                    },
                };
                (check.name().to_string(), outcome)
            })
            .collect();

        if let Some((name, failed)) = checks.iter().find(|(_, outcome)| !outcome.healthy) {
            status = HealthState::Degraded;
            if reason.is_none() {
                let detail = failed.message.as_deref().unwrap_or("check failed");
                reason = Some(format!("dependency check '{name}' failed: {detail}"));
            }
        }

        HealthStatus {
            status,
            ready: status.is_ready(),
            adapter,
            handler: reference_text,
            module,
            function,
            version: system::RUNTIME_VERSION.to_string(),
            reason,
            checks,
            timestamp: Utc::now(),
        }
    }
}
