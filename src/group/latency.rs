//! Concurrent latency probing across a group's backends.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::error::{GroupError, ProbeError};
use crate::group::resolver::ProxySetResolver;
use crate::observability::metrics;

/// Probes every backend of the current set in parallel.
#[derive(Debug)]
pub struct LatencyProber {
    group: String,
    resolver: Arc<ProxySetResolver>,
    /// Upper bound for a single probe, on top of the caller's token.
    timeout: Duration,
}

impl LatencyProber {
    pub fn new(
        group: impl Into<String>,
        resolver: Arc<ProxySetResolver>,
        timeout: Duration,
    ) -> Self {
        Self {
            group: group.into(),
            resolver,
            timeout,
        }
    }

    /// Latency per backend name. Backends whose probe fails are left out;
    /// if none succeed the call fails with [`GroupError::AllProbesFailed`].
    pub async fn probe_all(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<HashMap<String, Duration>, GroupError> {
        let backends = self.resolver.resolve(false);
        let attempted = backends.len();

        let mut tasks = JoinSet::new();
        for backend in backends {
            let cancel = cancel.child_token();
            let url = url.to_string();
            let timeout = self.timeout;
            tasks.spawn(async move {
                let result = tokio::select! {
                    _ = cancel.cancelled() => Err(ProbeError::Cancelled),
                    res = time::timeout(timeout, backend.probe(&cancel, &url)) => {
                        res.unwrap_or(Err(ProbeError::Timeout(timeout)))
                    }
                };
                (backend.name().to_string(), result)
            });
        }

        let mut delays = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(delay))) => {
                    metrics::record_probe(&self.group, &name, delay);
                    delays.insert(name, delay);
                }
                Ok((name, Err(e))) => {
                    tracing::debug!(
                        group = %self.group,
                        backend = %name,
                        error = %e,
                        "Probe failed"
                    );
                }
                Err(e) => {
                    tracing::error!(group = %self.group, error = %e, "Probe task panicked");
                }
            }
        }

        if delays.is_empty() {
            return Err(GroupError::AllProbesFailed {
                group: self.group.clone(),
                attempted,
            });
        }
        Ok(delays)
    }
}
