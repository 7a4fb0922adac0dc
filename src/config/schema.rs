//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for proxy groups.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::provider::VehicleKind;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Backend providers.
    pub providers: Vec<ProviderConfig>,

    /// Groups built on top of providers.
    pub groups: Vec<GroupConfig>,
}

/// A provider and its inline backend list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Unique provider identifier.
    pub name: String,

    /// Vehicle kind; `compatible` bypasses group-side caching.
    #[serde(default)]
    pub vehicle: VehicleKind,

    /// Provider-side health check.
    #[serde(default)]
    pub health_check: ProviderHealthCheckConfig,

    /// Backends served by this provider.
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// Provider health check settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderHealthCheckConfig {
    /// URL probed through each backend.
    pub url: String,

    /// Per-backend probe timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ProviderHealthCheckConfig {
    fn default() -> Self {
        Self {
            url: default_test_url(),
            timeout_ms: 5000,
        }
    }
}

/// A single upstream reachable as an HTTP proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique name within the provider.
    pub name: String,

    /// Proxy URL (e.g., "http://127.0.0.1:7890").
    pub address: String,
}

/// Proxy group configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupConfig {
    /// Group identifier for logging/metrics.
    pub name: String,

    /// Backtick-separated name filters; empty keeps everything.
    #[serde(default)]
    pub filter: String,

    /// Provider names, in resolution order.
    pub providers: Vec<String>,

    /// Failures within the window that trigger a health check.
    #[serde(default = "default_max_failed_times")]
    pub max_failed_times: u32,

    /// Failure window in milliseconds.
    #[serde(default = "default_failed_timeout_ms")]
    pub failed_timeout_ms: u64,

    /// URL used for latency probes.
    #[serde(default = "default_test_url")]
    pub test_url: String,

    /// Per-backend latency probe timeout in milliseconds.
    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

fn default_max_failed_times() -> u32 {
    5
}

fn default_failed_timeout_ms() -> u64 {
    5000
}

fn default_test_url() -> String {
    "http://www.gstatic.com/generate_204".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    5000
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
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
