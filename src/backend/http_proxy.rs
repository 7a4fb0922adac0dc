//! Backend reachable as an HTTP proxy.
//!
//! # Responsibilities
//! - Hold the proxy address for one upstream
//! - Probe a URL through the proxy and report the round-trip time

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Proxy};
use tokio::time;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::backend::{AdapterKind, Backend};
use crate::error::ProbeError;

/// A routed backend speaking HTTP proxy.
#[derive(Debug, Clone)]
pub struct HttpProxyBackend {
    name: String,
    address: Url,
    client: Client,
    timeout: Duration,
}

impl HttpProxyBackend {
    /// Create a backend for the proxy at `address`.
    pub fn new(
        name: impl Into<String>,
        address: Url,
        timeout: Duration,
    ) -> Result<Self, ProbeError> {
        let proxy = Proxy::all(address.as_str()).map_err(|e| ProbeError::Request(e.to_string()))?;
        let client = Client::builder()
            .proxy(proxy)
            .pool_max_idle_per_host(0)
            .user_agent("proxy-group-probe")
            .build()
            .map_err(|e| ProbeError::Request(e.to_string()))?;

        Ok(Self {
            name: name.into(),
            address,
            client,
            timeout,
        })
    }

    pub fn address(&self) -> &Url {
        &self.address
    }
}

#[async_trait]
impl Backend for HttpProxyBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Routed
    }

    async fn probe(&self, cancel: &CancellationToken, url: &str) -> Result<Duration, ProbeError> {
        let start = Instant::now();
        let request = self.client.get(url).send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(ProbeError::Cancelled),
            res = time::timeout(self.timeout, request) => match res {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => return Err(ProbeError::Request(e.to_string())),
                Err(_) => return Err(ProbeError::Timeout(self.timeout)),
            },
        };

        let status = response.status();
        if status.is_server_error() {
            tracing::debug!(backend = %self.name, %status, "Probe answered with server error");
            return Err(ProbeError::Request(format!("upstream returned {}", status)));
        }

        Ok(start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_creation() {
        let address = Url::parse("http://127.0.0.1:7890").unwrap();
        let backend =
            HttpProxyBackend::new("hk-01", address.clone(), Duration::from_secs(5)).unwrap();
        assert_eq!(backend.name(), "hk-01");
        assert_eq!(backend.kind(), AdapterKind::Routed);
        assert_eq!(backend.address(), &address);
    }

    #[tokio::test]
    async fn test_probe_honors_cancellation() {
        let address = Url::parse("http://127.0.0.1:9").unwrap();
        let backend = HttpProxyBackend::new("dead", address, Duration::from_secs(30)).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = backend.probe(&cancel, "http://example.com/generate_204").await;
        assert!(result.is_err());
    }
}
