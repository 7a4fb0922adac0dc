//! In-memory provider built from configuration.
//!
//! # Responsibilities
//! - Serve a fixed backend list that can be replaced at runtime
//! - Bump the version on every replacement
//! - Probe its backends on health check and remember who answered

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;
use tokio::task::JoinSet;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::backend::BackendRef;
use crate::config::ProviderHealthCheckConfig;
use crate::error::{ProbeError, ProviderError};
use crate::provider::{Provider, VehicleKind};

/// A provider whose list is supplied directly rather than fetched.
#[derive(Debug)]
pub struct InlineProvider {
    name: String,
    vehicle: VehicleKind,
    backends: ArcSwap<Vec<BackendRef>>,
    version: AtomicU32,
    touches: AtomicU64,
    alive: DashMap<String, bool>,
    check: ProviderHealthCheckConfig,
}

impl InlineProvider {
    pub fn new(
        name: impl Into<String>,
        vehicle: VehicleKind,
        backends: Vec<BackendRef>,
        check: ProviderHealthCheckConfig,
    ) -> Self {
        Self {
            name: name.into(),
            vehicle,
            backends: ArcSwap::from_pointee(backends),
            version: AtomicU32::new(1),
            touches: AtomicU64::new(0),
            alive: DashMap::new(),
            check,
        }
    }

    /// Swap in a new list and publish a new version. Liveness of backends
    /// no longer listed is forgotten.
    pub fn replace_backends(&self, backends: Vec<BackendRef>) {
        let names: HashSet<String> = backends.iter().map(|b| b.name().to_string()).collect();
        self.alive.retain(|name, _| names.contains(name));
        self.backends.store(Arc::new(backends));
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(provider = %self.name, version, "Provider backends replaced");
    }

    /// Liveness recorded by the last health check, if any.
    pub fn is_alive(&self, name: &str) -> Option<bool> {
        self.alive.get(name).map(|r| *r.value())
    }

    /// Number of refresh hints received.
    pub fn touch_count(&self) -> u64 {
        self.touches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Provider for InlineProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn touch(&self) {
        // Nothing upstream to refresh.
        self.touches.fetch_add(1, Ordering::Relaxed);
    }

    fn backends(&self) -> Vec<BackendRef> {
        self.backends.load().iter().cloned().collect()
    }

    fn version(&self) -> u32 {
        self.version.load(Ordering::Acquire)
    }

    fn vehicle_kind(&self) -> VehicleKind {
        self.vehicle
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        let backends = self.backends();
        if backends.is_empty() {
            return Ok(());
        }

        let timeout = Duration::from_millis(self.check.timeout_ms);
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();
        for backend in backends {
            let url = self.check.url.clone();
            let cancel = cancel.clone();
            tasks.spawn(async move {
                let result = time::timeout(timeout, backend.probe(&cancel, &url))
                    .await
                    .unwrap_or(Err(ProbeError::Timeout(timeout)));
                (backend.name().to_string(), result)
            });
        }

        let mut healthy = 0usize;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(delay))) => {
                    tracing::trace!(
                        provider = %self.name,
                        backend = %name,
                        ?delay,
                        "Backend alive"
                    );
                    self.alive.insert(name, true);
                    healthy += 1;
                }
                Ok((name, Err(e))) => {
                    tracing::debug!(
                        provider = %self.name,
                        backend = %name,
                        error = %e,
                        "Backend unreachable"
                    );
                    self.alive.insert(name, false);
                }
                Err(e) => {
                    tracing::error!(
                        provider = %self.name,
                        error = %e,
                        "Health check task panicked"
                    );
                }
            }
        }

        if healthy == 0 {
            return Err(ProviderError::NoBackends(self.name.clone()));
        }
        Ok(())
    }
}
