//! Route file schema definitions.
//!
//! This module defines the complete structure of a route file.
//! All types derive Serde traits for deserialization from TOML.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root of a route file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RoutesConfig {
    /// HTTP adapter settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Endpoints, each owning one method set.
    pub endpoints: Vec<EndpointConfig>,
}

/// HTTP adapter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One logical endpoint mounted under a path prefix.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Path prefix the endpoint is mounted at (e.g., "/users").
    pub prefix: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub description: String,

    /// Standard parameter record: field name to kind ("string", "u64", ...).
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// Chain sets keyed by method name.
    #[serde(default)]
    pub methods: BTreeMap<String, MethodConfig>,
}

/// Chains of one dispatch method.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MethodConfig {
    pub summary: String,
    pub description: String,
    pub params_description: String,
    pub chains: Vec<ChainConfig>,
}

/// One routable path shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChainConfig {
    pub name: String,

    #[serde(default)]
    pub summary: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub scope: String,

    /// Fallback chain used when nothing else matches.
    #[serde(default)]
    pub default: bool,

    /// Accept paths longer than the declared tokens.
    #[serde(default)]
    pub tail: bool,

    /// Disabled chains leave an empty slot that preparation drops.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Parameter record of this chain only; the endpoint's is used if absent.
    #[serde(default)]
    pub params: Option<BTreeMap<String, String>>,

    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

fn default_enabled() -> bool {
    true
}

/// One segment matcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TokenConfig {
    /// Regular expression the segment must match in full.
    #[serde(default)]
    pub expr: String,

    /// Destination field, or "_" to match without binding.
    pub var: String,

    #[serde(default)]
    pub description: String,
}
