//! Active health checking.
//!
//! # Responsibilities
//! - Run every provider's health check concurrently
//! - Guarantee at most one sweep per group at a time
//! - Clear the failure counter once a sweep completes

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::health::state::FailureCounter;
use crate::observability::metrics;
use crate::provider::ProviderRef;

/// What a call to [`HealthCheckCoordinator::run_sweep`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// A sweep ran; lists the providers whose check failed.
    Completed { failed: Vec<String> },
    /// Another sweep was already running.
    AlreadyRunning,
}

/// Single-flight health check over all providers of a group.
#[derive(Debug)]
pub struct HealthCheckCoordinator {
    group: String,
    providers: Arc<[ProviderRef]>,
    counter: Arc<FailureCounter>,
    in_flight: AtomicBool,
}

impl HealthCheckCoordinator {
    pub fn new(
        group: impl Into<String>,
        providers: Arc<[ProviderRef]>,
        counter: Arc<FailureCounter>,
    ) -> Self {
        Self {
            group: group.into(),
            providers,
            counter,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run one sweep unless one is already running. Never fails.
    pub async fn run_sweep(&self) -> SweepOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!(group = %self.group, "Health check already running");
            metrics::record_sweep(&self.group, "skipped");
            return SweepOutcome::AlreadyRunning;
        }
        let guard = InFlightGuard(&self.in_flight);

        tracing::info!(
            group = %self.group,
            providers = self.providers.len(),
            "Health check sweep starting"
        );

        let mut tasks = JoinSet::new();
        for provider in self.providers.iter().cloned() {
            tasks.spawn(async move {
                let result = provider.health_check().await;
                (provider.name().to_string(), result)
            });
        }

        let mut failed = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((provider, Err(e))) => {
                    tracing::warn!(
                        group = %self.group,
                        provider = %provider,
                        error = %e,
                        "Provider health check failed"
                    );
                    failed.push(provider);
                }
                Err(e) => {
                    tracing::error!(
                        group = %self.group,
                        error = %e,
                        "Provider health check task panicked"
                    );
                    failed.push(String::from("<panicked>"));
                }
            }
        }

        drop(guard);
        self.counter.reset();

        tracing::info!(group = %self.group, failed = failed.len(), "Health check sweep finished");
        metrics::record_sweep(&self.group, "completed");
        SweepOutcome::Completed { failed }
    }
}

/// Clears the in-flight flag even if the sweep future is dropped.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
