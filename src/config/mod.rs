//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → lifecycle::startup builds providers and groups from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes rebuild groups wholesale
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BackendConfig;
pub use schema::GroupConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProviderConfig;
pub use schema::ProviderHealthCheckConfig;
pub use schema::ProxyConfig;
pub use validation::ValidationError;
