//! Process-wide fallback backends.
//!
//! A group that resolves to an empty set substitutes the backend registered
//! under [`COMPATIBLE`] instead of failing its caller.

use std::sync::Arc;

use dashmap::DashMap;

use crate::backend::{BackendRef, CompatibleBackend};

/// Well-known key of the backend used when a group is empty.
pub const COMPATIBLE: &str = "COMPATIBLE";

/// Concurrent name -> backend registry.
#[derive(Debug, Clone)]
pub struct FallbackRegistry {
    inner: Arc<DashMap<String, BackendRef>>,
}

impl FallbackRegistry {
    /// Create a registry holding the built-in compatible backend.
    pub fn new() -> Self {
        let inner: DashMap<String, BackendRef> = DashMap::new();
        inner.insert(COMPATIBLE.to_string(), Arc::new(CompatibleBackend::new()));
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Register or replace a backend under `key`.
    pub fn register(&self, key: impl Into<String>, backend: BackendRef) {
        self.inner.insert(key.into(), backend);
    }

    pub fn get(&self, key: &str) -> Option<BackendRef> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// The backend substituted for an empty group.
    pub fn compatible(&self) -> Option<BackendRef> {
        self.get(COMPATIBLE)
    }
}

impl Default for FallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}
