//! Startup orchestration.
//!
//! # Responsibilities
//! - Build providers and their backends from validated configuration
//! - Build every group on top of its providers
//!
//! # Design Decisions
//! - Fail fast: a backend or group that cannot be built aborts startup
//! - Providers are shared between groups, never copied

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::backend::{BackendRef, HttpProxyBackend};
use crate::config::{GroupConfig, ProviderConfig, ProxyConfig};
use crate::error::{GroupError, ProbeError};
use crate::fallback::FallbackRegistry;
use crate::group::{GroupOptions, ProxyGroup};
use crate::health::FailurePolicy;
use crate::provider::{InlineProvider, ProviderRef};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("backend `{backend}`: invalid address: {source}")]
    Address {
        backend: String,
        #[source]
        source: url::ParseError,
    },

    #[error("backend `{backend}`: {source}")]
    Backend {
        backend: String,
        #[source]
        source: ProbeError,
    },

    #[error("group `{group}`: {source}")]
    Group {
        group: String,
        #[source]
        source: GroupError,
    },

    #[error("group `{group}` references unknown provider `{provider}`")]
    UnknownProvider { group: String, provider: String },
}

/// Live providers and groups built from one configuration.
#[derive(Debug, Default)]
pub struct GroupSet {
    pub providers: HashMap<String, Arc<InlineProvider>>,
    pub groups: HashMap<String, Arc<ProxyGroup>>,
}

impl GroupSet {
    pub fn group(&self, name: &str) -> Option<Arc<ProxyGroup>> {
        self.groups.get(name).cloned()
    }
}

/// Build every provider and group in `config`.
pub fn build_groups(
    config: &ProxyConfig,
    fallback: &FallbackRegistry,
) -> Result<GroupSet, StartupError> {
    let mut set = GroupSet::default();

    for provider in &config.providers {
        let built = build_provider(provider)?;
        set.providers.insert(provider.name.clone(), Arc::new(built));
    }

    for group in &config.groups {
        let built = build_group(group, &set.providers, fallback)?;
        tracing::info!(
            group = %group.name,
            providers = group.providers.len(),
            filter = %group.filter,
            "Group ready"
        );
        set.groups.insert(group.name.clone(), Arc::new(built));
    }

    Ok(set)
}

fn build_provider(config: &ProviderConfig) -> Result<InlineProvider, StartupError> {
    let timeout = Duration::from_millis(config.health_check.timeout_ms);
    let mut backends: Vec<BackendRef> = Vec::with_capacity(config.backends.len());
    for backend in &config.backends {
        let address = Url::parse(&backend.address).map_err(|source| StartupError::Address {
            backend: backend.name.clone(),
            source,
        })?;
        let built = HttpProxyBackend::new(backend.name.clone(), address, timeout).map_err(|source| {
            StartupError::Backend {
                backend: backend.name.clone(),
                source,
            }
        })?;
        backends.push(Arc::new(built));
    }

    Ok(InlineProvider::new(
        config.name.clone(),
        config.vehicle,
        backends,
        config.health_check.clone(),
    ))
}

fn build_group(
    config: &GroupConfig,
    providers: &HashMap<String, Arc<InlineProvider>>,
    fallback: &FallbackRegistry,
) -> Result<ProxyGroup, StartupError> {
    let mut members: Vec<ProviderRef> = Vec::with_capacity(config.providers.len());
    for name in &config.providers {
        let provider = providers.get(name).ok_or_else(|| StartupError::UnknownProvider {
            group: config.name.clone(),
            provider: name.clone(),
        })?;
        members.push(provider.clone());
    }

    let options = GroupOptions::new(config.name.clone(), members)
        .with_filter(config.filter.clone())
        .with_failure_policy(FailurePolicy {
            max_failed_times: config.max_failed_times,
            window: Duration::from_millis(config.failed_timeout_ms),
        })
        .with_probe_timeout(Duration::from_millis(config.probe_timeout_ms))
        .with_fallback(fallback.clone());

    ProxyGroup::new(options).map_err(|source| StartupError::Group {
        group: config.name.clone(),
        source,
    })
}
