//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (groups reference existing providers)
//! - Validate value ranges (thresholds and timeouts > 0, URLs parse)
//! - Reject filters that do not compile
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::group::FilterSet;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("duplicate provider name `{0}`")]
    DuplicateProvider(String),

    #[error("duplicate group name `{0}`")]
    DuplicateGroup(String),

    #[error("group `{group}` references unknown provider `{provider}`")]
    UnknownProvider { group: String, provider: String },

    #[error("group `{group}` has an invalid filter: {reason}")]
    InvalidFilter { group: String, reason: String },

    #[error("{owner}: `{field}` must be greater than zero")]
    NotPositive { owner: String, field: &'static str },

    #[error("{owner}: invalid URL `{url}`")]
    InvalidUrl { owner: String, url: String },

    #[error("provider `{provider}` lists backend `{backend}` twice")]
    DuplicateBackend { provider: String, backend: String },
}

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut providers = HashSet::new();
    for provider in &config.providers {
        if !providers.insert(provider.name.as_str()) {
            errors.push(ValidationError::DuplicateProvider(provider.name.clone()));
        }

        let owner = format!("provider `{}`", provider.name);
        check_url(&owner, &provider.health_check.url, &mut errors);
        if provider.health_check.timeout_ms == 0 {
            errors.push(ValidationError::NotPositive {
                owner: owner.clone(),
                field: "health_check.timeout_ms",
            });
        }

        let mut backends = HashSet::new();
        for backend in &provider.backends {
            if !backends.insert(backend.name.as_str()) {
                errors.push(ValidationError::DuplicateBackend {
                    provider: provider.name.clone(),
                    backend: backend.name.clone(),
                });
            }
            check_url(&format!("backend `{}`", backend.name), &backend.address, &mut errors);
        }
    }

    let mut groups = HashSet::new();
    for group in &config.groups {
        if !groups.insert(group.name.as_str()) {
            errors.push(ValidationError::DuplicateGroup(group.name.clone()));
        }

        for provider in &group.providers {
            if !providers.contains(provider.as_str()) {
                errors.push(ValidationError::UnknownProvider {
                    group: group.name.clone(),
                    provider: provider.clone(),
                });
            }
        }

        if let Err(e) = FilterSet::parse(&group.filter) {
            errors.push(ValidationError::InvalidFilter {
                group: group.name.clone(),
                reason: e.to_string(),
            });
        }

        let owner = format!("group `{}`", group.name);
        if group.max_failed_times == 0 {
            errors.push(ValidationError::NotPositive {
                owner: owner.clone(),
                field: "max_failed_times",
            });
        }
        if group.failed_timeout_ms == 0 {
            errors.push(ValidationError::NotPositive {
                owner: owner.clone(),
                field: "failed_timeout_ms",
            });
        }
        if group.probe_timeout_ms == 0 {
            errors.push(ValidationError::NotPositive {
                owner: owner.clone(),
                field: "probe_timeout_ms",
            });
        }
        check_url(&owner, &group.test_url, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(owner: &str, url: &str, errors: &mut Vec<ValidationError>) {
    if Url::parse(url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            owner: owner.to_string(),
            url: url.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{
        BackendConfig, GroupConfig, ProviderConfig, ProviderHealthCheckConfig,
    };
    use crate::provider::VehicleKind;

    fn provider(name: &str) -> ProviderConfig {
        ProviderConfig {
            name: name.to_string(),
            vehicle: VehicleKind::Inline,
            health_check: ProviderHealthCheckConfig::default(),
            backends: vec![BackendConfig {
                name: "HK-01".into(),
                address: "http://10.0.0.1:8080".into(),
            }],
        }
    }

    fn group(name: &str, providers: &[&str]) -> GroupConfig {
        GroupConfig {
            name: name.to_string(),
            filter: String::new(),
            providers: providers.iter().map(|p| p.to_string()).collect(),
            max_failed_times: 5,
            failed_timeout_ms: 5000,
            test_url: "http://www.gstatic.com/generate_204".into(),
            probe_timeout_ms: 5000,
        }
    }

    #[test]
    fn test_valid_config() {
        let config = ProxyConfig {
            providers: vec![provider("sub")],
            groups: vec![group("auto", &["sub"])],
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_lookaround_filter_is_accepted() {
        let mut auto = group("auto", &["sub"]);
        auto.filter = "^((?!HK).)*$`JP".into();
        let config = ProxyConfig {
            providers: vec![provider("sub")],
            groups: vec![auto],
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut bad = group("auto", &["missing"]);
        bad.filter = "HK`(".into();
        bad.max_failed_times = 0;

        let config = ProxyConfig {
            providers: vec![provider("sub"), provider("sub")],
            groups: vec![bad],
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::DuplicateProvider("sub".into())));
        assert!(errors.contains(&ValidationError::UnknownProvider {
            group: "auto".into(),
            provider: "missing".into(),
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::InvalidFilter { .. })));
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::NotPositive {
                field: "max_failed_times",
                ..
            }
        )));
    }

    #[test]
    fn test_invalid_backend_address() {
        let mut p = provider("sub");
        p.backends.push(BackendConfig {
            name: "HK-01".into(),
            address: "not a url".into(),
        });
        let config = ProxyConfig {
            providers: vec![p],
            ..Default::default()
        };

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
