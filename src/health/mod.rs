//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Passive (passive.rs):
//!     Dial outcome reported by the group policy
//!     → Count failure in state.rs
//!     → Threshold reached in window, or connection refused
//!     → Spawn active sweep
//!
//! Active (active.rs):
//!     Single-flight guard
//!     → Every provider's health check, concurrently
//!     → Reset failure counter
//! ```
//!
//! # Design Decisions
//! - Failure state is per group, not per backend
//! - Failure count and window start share one lock; nothing else is locked
//! - Provider failures are logged, never propagated

pub mod active;
pub mod passive;
pub mod state;

pub use active::{HealthCheckCoordinator, SweepOutcome};
pub use passive::{is_connection_refused, FailureTracker};
pub use state::{EscalationState, FailureCounter, FailureOutcome, FailurePolicy};
