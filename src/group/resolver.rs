//! Effective backend set resolution.
//!
//! # Responsibilities
//! - Merge provider lists into the group's ordered backend set
//! - Apply name filters, caching the result per provider
//! - Substitute the fallback backend when nothing is eligible
//!
//! # Design Decisions
//! - Each cache slot is gated by the provider version it was computed at
//! - Only the thread that wins the compare-exchange on a slot's version
//!   recomputes it; the new list is published with a single pointer swap
//! - Compatible vehicles are authoritative and re-read on every call

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::backend::BackendRef;
use crate::fallback::FallbackRegistry;
use crate::group::filter::FilterSet;
use crate::observability;
use crate::provider::{ProviderRef, VehicleKind};

/// Version value of a slot that has never been computed.
const UNSEEN: u64 = u64::MAX;

/// Filtered backends of one provider and the version they were computed at.
#[derive(Debug)]
struct CacheSlot {
    version: AtomicU64,
    backends: ArcSwap<Vec<BackendRef>>,
}

impl CacheSlot {
    fn new() -> Self {
        Self {
            version: AtomicU64::new(UNSEEN),
            backends: ArcSwap::from_pointee(Vec::new()),
        }
    }
}

/// Resolves a group's current backend set from its providers.
#[derive(Debug)]
pub struct ProxySetResolver {
    group: String,
    filters: FilterSet,
    providers: Arc<[ProviderRef]>,
    /// One slot per provider, same order.
    slots: Vec<CacheSlot>,
    fallback: FallbackRegistry,
    resolved: metrics::Gauge,
}

impl ProxySetResolver {
    pub fn new(
        group: impl Into<String>,
        filters: FilterSet,
        providers: Arc<[ProviderRef]>,
        fallback: FallbackRegistry,
    ) -> Self {
        let group = group.into();
        let slots = providers.iter().map(|_| CacheSlot::new()).collect();
        let resolved = observability::metrics::resolved_gauge(&group);
        Self {
            group,
            filters,
            providers,
            slots,
            fallback,
            resolved,
        }
    }

    /// Current ordered backend set. `touch` asks each provider to refresh first.
    pub fn resolve(&self, touch: bool) -> Vec<BackendRef> {
        let backends = if self.filters.is_empty() {
            self.collect_unfiltered(touch)
        } else {
            self.collect_filtered(touch)
        };

        if backends.is_empty() {
            return self.fallback_set();
        }

        self.resolved.set(backends.len() as f64);
        backends
    }

    /// Ask every provider to refresh its upstream.
    pub fn touch(&self) {
        for provider in self.providers.iter() {
            provider.touch();
        }
    }

    pub fn providers(&self) -> &[ProviderRef] {
        &self.providers
    }

    fn collect_unfiltered(&self, touch: bool) -> Vec<BackendRef> {
        let mut backends = Vec::new();
        for provider in self.providers.iter() {
            if touch {
                provider.touch();
            }
            backends.extend(provider.backends());
        }
        backends
    }

    fn collect_filtered(&self, touch: bool) -> Vec<BackendRef> {
        for (provider, slot) in self.providers.iter().zip(&self.slots) {
            if touch {
                provider.touch();
            }

            let live = u64::from(provider.version());
            if provider.vehicle_kind() == VehicleKind::Compatible {
                slot.version.store(live, Ordering::Release);
                slot.backends.store(Arc::new(provider.backends()));
                continue;
            }

            let cached = slot.version.load(Ordering::Acquire);
            if cached != live
                && slot
                    .version
                    .compare_exchange(cached, live, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            {
                let selected = self.filters.select(&provider.backends());
                tracing::debug!(
                    group = %self.group,
                    provider = %provider.name(),
                    version = live,
                    selected = selected.len(),
                    "Provider cache refreshed"
                );
                slot.backends.store(Arc::new(selected));
            }
        }

        let mut backends = Vec::new();
        for slot in &self.slots {
            backends.extend(slot.backends.load().iter().cloned());
        }

        // Per-provider selection cannot see names shared across providers.
        if !backends.is_empty() && self.providers.len() > 1 && self.filters.len() > 1 {
            backends = self.filters.select_then_rest(&backends);
        }
        backends
    }

    fn fallback_set(&self) -> Vec<BackendRef> {
        match self.fallback.compatible() {
            Some(backend) => {
                tracing::debug!(group = %self.group, "No eligible backends, using fallback");
                self.resolved.set(0.0);
                vec![backend]
            }
            None => {
                tracing::warn!(
                    group = %self.group,
                    "No eligible backends and no fallback registered"
                );
                Vec::new()
            }
        }
    }
}
