//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Group core produces:
//!     → logging.rs (structured log events, group name on every line)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
