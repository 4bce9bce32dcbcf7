//! # Runtime Constants
//!
//! Names, defaults and enumerations shared by the dispatcher, the backend
//! adapters and the process entry point.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Process environment variables read at startup
pub mod env {
    /// Selects the active component (`<module>:<callable>`)
    pub const HANDLER: &str = "HANDLER";

    /// Prefix for every other runtime setting (`FOUNDRY_ADAPTER`, `FOUNDRY_BIND_ADDRESS`, ...)
    pub const PREFIX: &str = "FOUNDRY";

    /// Optional path to a TOML settings file
    pub const CONFIG_PATH: &str = "FOUNDRY_CONFIG_PATH";

    /// JSON object of component settings, merged over the file's `[component]` table
    pub const COMPONENT_CONFIG: &str = "FOUNDRY_COMPONENT_CONFIG";

    /// Port assigned by a serverless functions host to its custom handler
    pub const FUNCTIONS_CUSTOMHANDLER_PORT: &str = "FUNCTIONS_CUSTOMHANDLER_PORT";
}

/// Built-in defaults
pub mod defaults {
    /// Component served when `HANDLER` is absent
    pub const HANDLER: &str = "components.word_count:predict";

    pub const BIND_ADDRESS: &str = "0.0.0.0:8000";
    pub const CONFIG_FILE: &str = "config/foundry.toml";
    pub const ENVIRONMENT: &str = "development";
    pub const REQUEST_TIMEOUT_MS: u64 = 30_000;
    pub const MAX_REQUEST_BYTES: usize = 2 * 1024 * 1024;
}

/// Structured-action names
pub mod actions {
    /// The single declared action of a deployed component
    pub const PREDICT: &str = "predict";

    /// Names accepted as synonyms of [`PREDICT`]
    pub const ALIASES: &[&str] = &["process", "execute"];

    /// Server name advertised in the action schema
    pub const SERVER_NAME: &str = "component-server";
}

pub mod system {
    /// Runtime version reported by health probes and the action schema
    pub const RUNTIME_VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Placeholder for module/function names of an unparsable reference
    pub const UNKNOWN: &str = "unknown";

    /// Header carrying the per-request correlation id
    pub const REQUEST_ID_HEADER: &str = "x-request-id";

    /// Status value used by failure records and error bodies
    pub const FAILED_STATUS: &str = "failed";
}

/// Hosting backend served by a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum AdapterKind {
    /// Generic web container: synchronous JSON over HTTP
    Rest,
    /// Serverless functions host using the custom-handler invocation envelope
    Functions,
    /// Managed online scoring and offline mini-batch endpoints
    Batch,
    /// Structured action calls from agent/tool clients
    Action,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Rest => "rest",
            AdapterKind::Functions => "functions",
            AdapterKind::Batch => "batch",
            AdapterKind::Action => "action",
        }
    }

    pub fn all() -> &'static [AdapterKind] {
        &[
            AdapterKind::Rest,
            AdapterKind::Functions,
            AdapterKind::Batch,
            AdapterKind::Action,
        ]
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rest" | "container" | "web" => Ok(AdapterKind::Rest),
            "functions" | "function" => Ok(AdapterKind::Functions),
            "batch" | "endpoint" => Ok(AdapterKind::Batch),
            "action" | "mcp" => Ok(AdapterKind::Action),
            other => Err(format!(
                "unknown adapter '{other}' (expected one of: rest, functions, batch, action)"
            )),
        }
    }
}

impl TryFrom<String> for AdapterKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl TryFrom<String> for LogFormat {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}' (expected pretty or json)")),
        }
    }
}
