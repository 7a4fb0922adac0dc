//! Provider subsystem.
//!
//! # Data Flow
//! ```text
//! Provider (subscription, file, inline list)
//!     → backends()        current list, cheap
//!     → version()         bumped whenever backends() changes
//!     → health_check()    provider-owned probing, may block
//! ```
//!
//! # Design Decisions
//! - Groups hold shared references; providers are never mutated by a group
//! - `Compatible` vehicles are authoritative and re-read on every resolve

pub mod inline;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::backend::BackendRef;
use crate::error::ProviderError;

pub use inline::InlineProvider;

/// Shared handle to a provider.
pub type ProviderRef = Arc<dyn Provider>;

/// How a provider obtains its backend list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleKind {
    #[default]
    Inline,
    File,
    Http,
    /// Passthrough list that bypasses group-side caching.
    Compatible,
}

impl fmt::Display for VehicleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VehicleKind::Inline => "inline",
            VehicleKind::File => "file",
            VehicleKind::Http => "http",
            VehicleKind::Compatible => "compatible",
        };
        f.write_str(s)
    }
}

/// A versioned source of backend candidates.
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Hint the provider to refresh its upstream. Fire-and-forget.
    fn touch(&self);

    /// The present backend list.
    fn backends(&self) -> Vec<BackendRef>;

    /// Monotonically non-decreasing; changes whenever `backends()` would.
    fn version(&self) -> u32;

    fn vehicle_kind(&self) -> VehicleKind;

    /// Run the provider's own probing logic.
    async fn health_check(&self) -> Result<(), ProviderError>;
}
