//! # Runtime Configuration
//!
//! Layered settings for a runtime process. Later layers win:
//!
//! 1. built-in defaults
//! 2. optional TOML file (`FOUNDRY_CONFIG_PATH`, else `config/foundry.toml`)
//! 3. `FOUNDRY_*` environment variables
//! 4. the unprefixed `HANDLER` variable
//! 5. `FUNCTIONS_CUSTOMHANDLER_PORT`, which replaces the bind port
//!
//! Component settings live in the file's `[component]` table. Keys from the
//! JSON object in `FOUNDRY_COMPONENT_CONFIG` override it one by one.
//!
//! The handler reference is not validated here. A malformed reference still
//! boots the process and is reported by the health probe.

use crate::components::ComponentSettings;
use crate::constants::{defaults, env, AdapterKind, LogFormat};
use crate::error::{FoundryError, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Active handler reference (`<module>:<callable>`)
    pub handler: String,
    /// Backend protocol served by this process
    pub adapter: AdapterKind,
    pub bind_address: String,
    /// Resolve the handler before accepting traffic
    pub eager_resolve: bool,
    pub environment: String,
    pub log_format: LogFormat,
    pub request_timeout_ms: u64,
    pub max_request_bytes: usize,
    /// Settings handed to the component factory
    #[serde(default)]
    pub component: ComponentSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            handler: defaults::HANDLER.to_string(),
            adapter: AdapterKind::Rest,
            bind_address: defaults::BIND_ADDRESS.to_string(),
            eager_resolve: true,
            environment: defaults::ENVIRONMENT.to_string(),
            log_format: LogFormat::Pretty,
            request_timeout_ms: defaults::REQUEST_TIMEOUT_MS,
            max_request_bytes: defaults::MAX_REQUEST_BYTES,
            component: ComponentSettings::new(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load_from_env_map(std::env::vars().collect())
    }

    /// Load configuration from an explicit set of variables instead of the
    /// process environment
    pub fn load_from_env_map(vars: HashMap<String, String>) -> Result<Self> {
        let config_path = vars
            .get(env::CONFIG_PATH)
            .cloned()
            .unwrap_or_else(|| defaults::CONFIG_FILE.to_string());

        debug!(config_path = %config_path, "Loading runtime configuration");

        let settings = Config::builder()
            .set_default("handler", defaults::HANDLER)?
            .set_default("adapter", AdapterKind::Rest.as_str())?
            .set_default("bind_address", defaults::BIND_ADDRESS)?
            .set_default("eager_resolve", true)?
            .set_default("environment", defaults::ENVIRONMENT)?
            .set_default("log_format", "pretty")?
            .set_default("request_timeout_ms", defaults::REQUEST_TIMEOUT_MS as i64)?
            .set_default("max_request_bytes", defaults::MAX_REQUEST_BYTES as i64)?
            .add_source(File::new(&config_path, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(env::PREFIX)
                    .try_parsing(true)
                    .source(Some(vars.clone())),
            )
            .set_override_option("handler", vars.get(env::HANDLER).cloned())?
            .build()?;

        let mut config: RuntimeConfig = settings.try_deserialize()?;

        if let Some(raw) = vars.get(env::COMPONENT_CONFIG) {
            config.component.extend(parse_component_config(raw)?);
        }

        if let Some(port) = vars.get(env::FUNCTIONS_CUSTOMHANDLER_PORT) {
            config.bind_address = config.with_port(port)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        if self.request_timeout_ms == 0 {
            return Err(FoundryError::settings(
                "request_timeout_ms must be greater than zero",
            ));
        }
        if self.max_request_bytes == 0 {
            return Err(FoundryError::settings(
                "max_request_bytes must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address.parse().map_err(|e| {
            FoundryError::settings(format!(
                "invalid bind_address '{}': {e}",
                self.bind_address
            ))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    fn with_port(&self, port: &str) -> Result<String> {
        let port: u16 = port.trim().parse().map_err(|e| {
            FoundryError::settings(format!(
                "invalid {}: '{port}': {e}",
                env::FUNCTIONS_CUSTOMHANDLER_PORT
            ))
        })?;
        let mut addr = self.socket_addr()?;
        addr.set_port(port);
        Ok(addr.to_string())
    }
}

fn parse_component_config(raw: &str) -> Result<ComponentSettings> {
    match serde_json::from_str(raw) {
        Ok(serde_json::Value::Object(settings)) => Ok(settings),
        Ok(other) => Err(FoundryError::settings(format!(
            "{} must be a JSON object, got {other}",
            env::COMPONENT_CONFIG
        ))),
        Err(e) => Err(FoundryError::settings(format!(
            "invalid {}: {e}",
            env::COMPONENT_CONFIG
        ))),
    }
}
