//! Backend abstraction.
//!
//! # Responsibilities
//! - Represent a single upstream endpoint a connection can be routed through
//! - Classify backends so sentinel kinds stay out of failure accounting
//! - Measure liveness/latency on demand
//!
//! # Design Decisions
//! - Dialing is not part of this trait; the group core only probes
//! - Names are stable and used as de-duplication keys

pub mod compatible;
pub mod http_proxy;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ProbeError;

pub use compatible::CompatibleBackend;
pub use http_proxy::HttpProxyBackend;

/// Shared handle to a backend.
pub type BackendRef = Arc<dyn Backend>;

/// Classification of a backend adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdapterKind {
    Direct,
    Reject,
    Pass,
    Compatible,
    Routed,
}

impl AdapterKind {
    /// Sentinel kinds are not real upstreams and never count toward group health.
    pub fn is_sentinel(self) -> bool {
        matches!(
            self,
            AdapterKind::Direct | AdapterKind::Reject | AdapterKind::Pass | AdapterKind::Compatible
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdapterKind::Direct => "direct",
            AdapterKind::Reject => "reject",
            AdapterKind::Pass => "pass",
            AdapterKind::Compatible => "compatible",
            AdapterKind::Routed => "routed",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single concrete upstream.
#[async_trait]
pub trait Backend: Send + Sync + fmt::Debug {
    /// Stable identifier.
    fn name(&self) -> &str;

    fn kind(&self) -> AdapterKind;

    /// Measure latency to `url` through this backend.
    ///
    /// Implementations must return promptly once `cancel` fires.
    async fn probe(&self, cancel: &CancellationToken, url: &str) -> Result<Duration, ProbeError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_kinds() {
        assert!(AdapterKind::Direct.is_sentinel());
        assert!(AdapterKind::Reject.is_sentinel());
        assert!(AdapterKind::Pass.is_sentinel());
        assert!(AdapterKind::Compatible.is_sentinel());
        assert!(!AdapterKind::Routed.is_sentinel());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(AdapterKind::Routed.to_string(), "routed");
        assert_eq!(AdapterKind::Compatible.to_string(), "compatible");
    }
}
