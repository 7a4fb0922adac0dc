//! Shared mock collaborators for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use proxy_group::error::{ProbeError, ProviderError};
use proxy_group::{AdapterKind, Backend, BackendRef, Provider, VehicleKind};

/// How a mock backend answers a probe.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    /// Succeed after the given delay.
    After(Duration),
    /// Fail immediately.
    Fail,
    /// Never answer and ignore cancellation.
    Hang,
}

#[derive(Debug)]
pub struct MockBackend {
    name: String,
    kind: AdapterKind,
    reply: Reply,
}

impl MockBackend {
    pub fn new(name: &str, reply: Reply) -> BackendRef {
        Arc::new(Self {
            name: name.to_string(),
            kind: AdapterKind::Routed,
            reply,
        })
    }

    pub fn named(name: &str) -> BackendRef {
        Self::new(name, Reply::After(Duration::from_millis(10)))
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AdapterKind {
        self.kind
    }

    async fn probe(&self, _cancel: &CancellationToken, _url: &str) -> Result<Duration, ProbeError> {
        match self.reply {
            Reply::After(delay) => {
                tokio::time::sleep(delay).await;
                Ok(delay)
            }
            Reply::Fail => Err(ProbeError::Request("connection reset".into())),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub fn backends(names: &[&str]) -> Vec<BackendRef> {
    names.iter().map(|n| MockBackend::named(n)).collect()
}

pub fn names(backends: &[BackendRef]) -> Vec<String> {
    backends.iter().map(|b| b.name().to_string()).collect()
}

/// Provider that counts how it is used.
#[derive(Debug)]
pub struct MockProvider {
    name: String,
    vehicle: VehicleKind,
    backends: Mutex<Vec<BackendRef>>,
    version: AtomicU32,
    pub reads: AtomicUsize,
    pub touches: AtomicUsize,
    pub checks: AtomicUsize,
    active_checks: AtomicUsize,
    pub max_active_checks: AtomicUsize,
    check_delay: Duration,
    check_fails: bool,
}

impl MockProvider {
    pub fn new(name: &str, backends: Vec<BackendRef>) -> Arc<Self> {
        Self::build(name, VehicleKind::Inline, backends, Duration::ZERO, false)
    }

    pub fn compatible(name: &str, backends: Vec<BackendRef>) -> Arc<Self> {
        Self::build(name, VehicleKind::Compatible, backends, Duration::ZERO, false)
    }

    pub fn slow_check(name: &str, delay: Duration) -> Arc<Self> {
        Self::build(name, VehicleKind::Inline, Vec::new(), delay, false)
    }

    pub fn failing_check(name: &str) -> Arc<Self> {
        Self::build(name, VehicleKind::Inline, Vec::new(), Duration::ZERO, true)
    }

    fn build(
        name: &str,
        vehicle: VehicleKind,
        backends: Vec<BackendRef>,
        check_delay: Duration,
        check_fails: bool,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            vehicle,
            backends: Mutex::new(backends),
            version: AtomicU32::new(1),
            reads: AtomicUsize::new(0),
            touches: AtomicUsize::new(0),
            checks: AtomicUsize::new(0),
            active_checks: AtomicUsize::new(0),
            max_active_checks: AtomicUsize::new(0),
            check_delay,
            check_fails,
        })
    }

    /// Replace the list and bump the version.
    pub fn set_backends(&self, backends: Vec<BackendRef>) {
        *self.backends.lock().unwrap() = backends;
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn touch(&self) {
        self.touches.fetch_add(1, Ordering::SeqCst);
    }

    fn backends(&self) -> Vec<BackendRef> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.backends.lock().unwrap().clone()
    }

    fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    fn vehicle_kind(&self) -> VehicleKind {
        self.vehicle
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        let active = self.active_checks.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active_checks.fetch_max(active, Ordering::SeqCst);

        if !self.check_delay.is_zero() {
            tokio::time::sleep(self.check_delay).await;
        }
        self.active_checks.fetch_sub(1, Ordering::SeqCst);

        if self.check_fails {
            return Err(ProviderError::HealthCheck {
                provider: self.name.clone(),
                reason: "subscription unreachable".into(),
            });
        }
        Ok(())
    }
}
