//! Proxy group core.
//!
//! # Data Flow
//! ```text
//! Group policy wants a backend
//!     → resolver.rs (merge providers, filter, cache per provider version)
//!     → policy picks one and dials it
//!     → FailureTracker (health/passive.rs) gets the outcome
//!         → may spawn a sweep (health/active.rs)
//!
//! Diagnostics:
//!     → latency.rs (probe every resolved backend concurrently)
//! ```
//!
//! # Design Decisions
//! - Selection policy lives outside this module
//! - Resolution never spawns tasks; probing and sweeps wait on all their tasks
//! - Reconfiguration builds a new group rather than mutating this one

pub mod filter;
pub mod latency;
pub mod resolver;

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

use crate::backend::{AdapterKind, BackendRef};
use crate::error::GroupError;
use crate::fallback::FallbackRegistry;
use crate::health::{
    EscalationState, FailureCounter, FailurePolicy, FailureTracker, HealthCheckCoordinator,
    SweepOutcome,
};
use crate::provider::ProviderRef;

pub use filter::FilterSet;
pub use latency::LatencyProber;
pub use resolver::ProxySetResolver;

/// Default bound on a single latency probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything needed to build a group.
#[derive(Debug, Clone)]
pub struct GroupOptions {
    pub name: String,
    /// Backtick-separated regular expressions; empty keeps every backend.
    pub filter: String,
    pub providers: Vec<ProviderRef>,
    pub failure_policy: FailurePolicy,
    pub probe_timeout: Duration,
    pub fallback: FallbackRegistry,
    /// Runtime that escalated sweeps are spawned on. Defaults to the
    /// runtime the group is built in.
    pub runtime: Option<Handle>,
}

impl GroupOptions {
    pub fn new(name: impl Into<String>, providers: Vec<ProviderRef>) -> Self {
        Self {
            name: name.into(),
            filter: String::new(),
            providers,
            failure_policy: FailurePolicy::default(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            fallback: FallbackRegistry::new(),
            runtime: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_fallback(mut self, fallback: FallbackRegistry) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }
}

/// Shared membership and recovery state of one proxy group.
#[derive(Debug)]
pub struct ProxyGroup {
    name: String,
    resolver: Arc<ProxySetResolver>,
    tracker: FailureTracker,
    coordinator: Arc<HealthCheckCoordinator>,
    prober: LatencyProber,
}

impl ProxyGroup {
    pub fn new(options: GroupOptions) -> Result<Self, GroupError> {
        let filters = FilterSet::parse(&options.filter)?;
        let providers: Arc<[ProviderRef]> = options.providers.into();
        let counter = Arc::new(FailureCounter::new(options.failure_policy));
        let runtime = options.runtime.or_else(|| Handle::try_current().ok());

        let resolver = Arc::new(ProxySetResolver::new(
            options.name.clone(),
            filters,
            providers.clone(),
            options.fallback,
        ));
        let coordinator = Arc::new(HealthCheckCoordinator::new(
            options.name.clone(),
            providers,
            counter.clone(),
        ));
        let tracker = FailureTracker::new(
            options.name.clone(),
            counter,
            coordinator.clone(),
            runtime,
        );
        let prober = LatencyProber::new(
            options.name.clone(),
            resolver.clone(),
            options.probe_timeout,
        );

        Ok(Self {
            name: options.name,
            resolver,
            tracker,
            coordinator,
            prober,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current ordered backend set; never empty while a fallback is registered.
    pub fn resolve(&self, touch: bool) -> Vec<BackendRef> {
        self.resolver.resolve(touch)
    }

    /// Ask every provider to refresh its upstream.
    pub fn touch(&self) {
        self.resolver.touch();
    }

    pub fn on_dial_failure(&self, kind: AdapterKind, error: &(dyn Error + 'static)) {
        self.tracker.on_dial_failure(kind, error);
    }

    pub fn on_dial_success(&self) {
        self.tracker.on_dial_success();
    }

    /// Run a sweep now and wait for it.
    pub async fn health_check(&self) -> SweepOutcome {
        self.coordinator.run_sweep().await
    }

    pub async fn probe_all(
        &self,
        cancel: &CancellationToken,
        url: &str,
    ) -> Result<HashMap<String, Duration>, GroupError> {
        self.prober.probe_all(cancel, url).await
    }

    pub fn failures(&self) -> u32 {
        self.tracker.failures()
    }

    pub fn escalation_state(&self) -> EscalationState {
        self.tracker.state()
    }

    pub fn is_health_check_running(&self) -> bool {
        self.coordinator.is_in_flight()
    }
}
