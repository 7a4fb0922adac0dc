//! Proxy group membership and failure-recovery core.

pub mod backend;
pub mod config;
pub mod error;
pub mod fallback;
pub mod group;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod provider;

pub use backend::{AdapterKind, Backend, BackendRef};
pub use config::schema::ProxyConfig;
pub use error::{GroupError, ProbeError, ProviderError};
pub use fallback::FallbackRegistry;
pub use group::{GroupOptions, ProxyGroup};
pub use provider::{Provider, ProviderRef, VehicleKind};
