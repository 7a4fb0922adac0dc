//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Providers → Groups
//!
//! Signals (signals.rs):
//!     SIGINT → Cancel in-flight probes
//! ```
//!
//! # Design Decisions
//! - Ordered startup: providers first, then groups that reference them
//! - Reconfiguration rebuilds the whole set

pub mod signals;
pub mod startup;

pub use startup::{build_groups, GroupSet, StartupError};
