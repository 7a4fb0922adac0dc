//! Passive health checking (failure detection).
//!
//! # Responsibilities
//! - Observe dial outcomes reported by the group policy
//! - Count failures inside the failure window
//! - Escalate to an active sweep on threshold breach or refused connection
//!
//! # Design Decisions
//! - Sentinel adapters (direct, reject, pass, compatible) never count
//! - A refused connection escalates at once and leaves the counter alone
//! - A success during a running sweep does not clear the counter

use std::error::Error;
use std::io;
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::time::Instant;

use crate::backend::AdapterKind;
use crate::health::active::HealthCheckCoordinator;
use crate::health::state::{EscalationState, FailureCounter, FailureOutcome};
use crate::observability::metrics;

/// Turns dial outcomes into escalation decisions.
#[derive(Debug)]
pub struct FailureTracker {
    group: String,
    counter: Arc<FailureCounter>,
    coordinator: Arc<HealthCheckCoordinator>,
    runtime: Option<Handle>,
}

impl FailureTracker {
    /// `runtime` receives escalated sweeps, so failures may be reported
    /// from threads that are not part of it.
    pub fn new(
        group: impl Into<String>,
        counter: Arc<FailureCounter>,
        coordinator: Arc<HealthCheckCoordinator>,
        runtime: Option<Handle>,
    ) -> Self {
        Self {
            group: group.into(),
            counter,
            coordinator,
            runtime,
        }
    }

    /// Record a failed dial through a backend of `kind`.
    pub fn on_dial_failure(&self, kind: AdapterKind, error: &(dyn Error + 'static)) {
        if kind.is_sentinel() {
            return;
        }
        metrics::record_dial_failure(&self.group, kind);

        if is_connection_refused(error) {
            tracing::debug!(
                group = %self.group,
                error = %error,
                "Connection refused, checking health now"
            );
            self.escalate();
            return;
        }

        match self.counter.record_failure(Instant::now()) {
            FailureOutcome::First => {
                tracing::debug!(group = %self.group, "First dial failure");
            }
            FailureOutcome::Counted(failures) => {
                tracing::debug!(group = %self.group, failures, "Dial failure counted");
            }
            FailureOutcome::WindowExpired => {
                tracing::debug!(group = %self.group, "Failure window elapsed, counter reset");
            }
            FailureOutcome::ThresholdReached(failures) => {
                tracing::warn!(
                    group = %self.group,
                    failures,
                    "Group failed multiple times, starting active health check"
                );
                self.escalate();
            }
        }
    }

    /// Record a successful dial.
    pub fn on_dial_success(&self) {
        if !self.coordinator.is_in_flight() {
            self.counter.reset();
        }
    }

    pub fn failures(&self) -> u32 {
        self.counter.failures()
    }

    pub fn state(&self) -> EscalationState {
        if self.coordinator.is_in_flight() {
            return EscalationState::Escalated;
        }
        self.counter.state()
    }

    /// Fire-and-forget sweep on the group's runtime, or the caller's.
    fn escalate(&self) {
        let handle = match &self.runtime {
            Some(handle) => handle.clone(),
            None => match Handle::try_current() {
                Ok(handle) => handle,
                Err(_) => {
                    tracing::warn!(
                        group = %self.group,
                        "No async runtime, health check not started"
                    );
                    return;
                }
            },
        };
        let coordinator = self.coordinator.clone();
        handle.spawn(async move {
            coordinator.run_sweep().await;
        });
    }
}

/// True if `error` or any of its sources is a refused connection.
pub fn is_connection_refused(error: &(dyn Error + 'static)) -> bool {
    let mut current: Option<&(dyn Error + 'static)> = Some(error);
    while let Some(err) = current {
        if let Some(io_err) = err.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        if err.to_string().to_ascii_lowercase().contains("connection refused") {
            return true;
        }
        current = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped(io::Error);

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "dial tcp failed")
        }
    }

    impl Error for Wrapped {
        fn source(&self) -> Option<&(dyn Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn test_refused_by_kind() {
        let err = io::Error::from(io::ErrorKind::ConnectionRefused);
        assert!(is_connection_refused(&err));
    }

    #[test]
    fn test_refused_in_source_chain() {
        let err = Wrapped(io::Error::new(io::ErrorKind::ConnectionRefused, "nope"));
        assert!(is_connection_refused(&err));
    }

    #[test]
    fn test_refused_by_message() {
        let err = io::Error::new(io::ErrorKind::Other, "dial tcp 1.2.3.4:443: Connection refused");
        assert!(is_connection_refused(&err));
    }

    #[test]
    fn test_timeout_is_not_refused() {
        let err = io::Error::from(io::ErrorKind::TimedOut);
        assert!(!is_connection_refused(&err));
    }
}
