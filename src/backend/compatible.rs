//! Built-in fallback backend.

use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::backend::{AdapterKind, Backend};
use crate::error::ProbeError;
use crate::fallback::COMPATIBLE;

/// Placeholder backend handed out when a group resolves to nothing.
#[derive(Debug, Default)]
pub struct CompatibleBackend;

impl CompatibleBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Backend for CompatibleBackend {
    fn name(&self) -> &str {
        COMPATIBLE
    }

    fn kind(&self) -> AdapterKind {
        AdapterKind::Compatible
    }

    async fn probe(&self, _cancel: &CancellationToken, _url: &str) -> Result<Duration, ProbeError> {
        Err(ProbeError::Unsupported(COMPATIBLE.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_compatible_cannot_be_probed() {
        let backend = CompatibleBackend::new();
        assert_eq!(backend.name(), "COMPATIBLE");
        assert!(backend.kind().is_sentinel());

        let result = backend.probe(&CancellationToken::new(), "http://example.com").await;
        assert!(matches!(result, Err(ProbeError::Unsupported(_))));
    }
}
