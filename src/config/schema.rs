//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// ConfigMap served when nothing else is configured.
pub const DEFAULT_CONFIGMAP_NAME: &str = "kube-root-ca.crt";

/// Longest server-side watch timeout the API server accepts from us.
pub const MAX_WATCH_TIMEOUT_SECS: u32 = 290;

/// Root configuration for cm2http.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// The ConfigMap being served and how to serve it.
    pub target: TargetConfig,

    /// Cluster connection settings.
    pub kube: KubeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5555").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5555".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// The watched ConfigMap.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Namespace of the ConfigMap. Empty means the client's default namespace.
    pub namespace: String,

    /// Name of the ConfigMap.
    pub name: String,

    /// Serve only this data key. Absent (or empty) serves every key.
    pub key: Option<String>,

    /// Data served at startup and after the ConfigMap is deleted.
    pub default_data: BTreeMap<String, String>,

    /// Server-side timeout for each watch request, in seconds.
    pub watch_timeout_secs: u32,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            namespace: String::new(),
            name: DEFAULT_CONFIGMAP_NAME.to_string(),
            key: None,
            default_data: BTreeMap::new(),
            watch_timeout_secs: MAX_WATCH_TIMEOUT_SECS,
        }
    }
}

impl TargetConfig {
    /// The configured key, with an empty string treated as "not set".
    pub fn selected_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Cluster connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct KubeConfig {
    /// Path to a kubeconfig file. `None` infers (in-cluster or `$KUBECONFIG`).
    pub kubeconfig: Option<String>,

    /// Kubeconfig context to use. `None` uses the current context.
    pub context: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
