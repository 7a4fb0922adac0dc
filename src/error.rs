//! Error types shared across the group core.

use std::time::Duration;
use thiserror::Error;

/// Errors surfaced by a proxy group to its owner.
#[derive(Debug, Error)]
pub enum GroupError {
    /// A segment of the filter string is not a valid regular expression.
    #[error("invalid filter pattern `{pattern}`: {source}")]
    InvalidFilter {
        pattern: String,
        #[source]
        source: fancy_regex::Error,
    },

    /// Every backend probe failed or was cancelled.
    #[error("group {group}: all {attempted} backend probes failed")]
    AllProbesFailed { group: String, attempted: usize },
}

/// Errors from a single backend liveness probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),

    #[error("probe cancelled")]
    Cancelled,

    #[error("probe request failed: {0}")]
    Request(String),

    /// The backend has no upstream that can be measured.
    #[error("backend {0} does not support probing")]
    Unsupported(String),
}

/// Errors from a provider's own health check.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider {provider}: {reason}")]
    HealthCheck { provider: String, reason: String },

    #[error("provider {0}: no backend answered the health check")]
    NoBackends(String),
}
