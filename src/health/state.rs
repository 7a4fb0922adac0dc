//! Group failure state machine.
//!
//! # States
//! - Healthy: no failures in the current window
//! - Accumulating: failures seen, threshold not reached
//! - Escalated: threshold reached or a sweep is running
//!
//! # State Transitions
//! ```text
//! Healthy → Accumulating: first dial failure (window starts)
//! Accumulating → Healthy: success, or next failure lands outside the window
//! Accumulating → Escalated: failure count >= max_failed_times within window
//! Escalated → Healthy: health-check sweep completes
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Default number of failures that escalates to a health check.
pub const DEFAULT_MAX_FAILED_TIMES: u32 = 5;

/// Default failure window.
pub const DEFAULT_FAILED_TIMEOUT: Duration = Duration::from_secs(5);

/// Thresholds governing escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailurePolicy {
    pub max_failed_times: u32,
    pub window: Duration,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self {
            max_failed_times: DEFAULT_MAX_FAILED_TIMES,
            window: DEFAULT_FAILED_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationState {
    Healthy,
    Accumulating,
    Escalated,
}

/// Result of recording one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Opened a new window.
    First,
    /// Counted, below threshold.
    Counted(u32),
    /// The window had already elapsed; the counter was cleared.
    WindowExpired,
    /// Threshold reached inside the window.
    ThresholdReached(u32),
}

#[derive(Debug, Default)]
struct Window {
    failures: u32,
    started: Option<Instant>,
}

/// Failure count and window start, guarded by one lock.
#[derive(Debug)]
pub struct FailureCounter {
    window: Mutex<Window>,
    policy: FailurePolicy,
}

impl FailureCounter {
    pub fn new(policy: FailurePolicy) -> Self {
        Self {
            window: Mutex::new(Window::default()),
            policy,
        }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Count one failure observed at `now`.
    pub fn record_failure(&self, now: Instant) -> FailureOutcome {
        let mut window = self.lock();
        window.failures += 1;

        let started = match window.started {
            Some(started) if window.failures > 1 => started,
            _ => {
                window.started = Some(now);
                if window.failures >= self.policy.max_failed_times {
                    return FailureOutcome::ThresholdReached(window.failures);
                }
                return FailureOutcome::First;
            }
        };

        if now.saturating_duration_since(started) > self.policy.window {
            *window = Window::default();
            return FailureOutcome::WindowExpired;
        }

        if window.failures >= self.policy.max_failed_times {
            FailureOutcome::ThresholdReached(window.failures)
        } else {
            FailureOutcome::Counted(window.failures)
        }
    }

    /// Clear the counter and close the window.
    pub fn reset(&self) {
        *self.lock() = Window::default();
    }

    pub fn failures(&self) -> u32 {
        self.lock().failures
    }

    /// Classify the counter alone; a running sweep is tracked elsewhere.
    pub fn state(&self) -> EscalationState {
        match self.failures() {
            0 => EscalationState::Healthy,
            n if n >= self.policy.max_failed_times => EscalationState::Escalated,
            _ => EscalationState::Accumulating,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Window> {
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for FailureCounter {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}
