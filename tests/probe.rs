//! Concurrent latency probing.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use proxy_group::{GroupError, GroupOptions, ProviderRef, ProxyGroup};

mod common;
use common::{MockBackend, MockProvider, Reply};

const URL: &str = "http://www.gstatic.com/generate_204";

fn group(backends: Vec<proxy_group::BackendRef>, probe_timeout: Duration) -> ProxyGroup {
    let provider: ProviderRef = MockProvider::new("sub", backends);
    let options = GroupOptions::new("test", vec![provider]).with_probe_timeout(probe_timeout);
    ProxyGroup::new(options).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_slow_backend_is_omitted() {
    let group = group(
        vec![
            MockBackend::new("HK-01", Reply::After(Duration::from_millis(120))),
            MockBackend::new("JP-01", Reply::After(Duration::from_millis(300))),
            MockBackend::new("US-01", Reply::After(Duration::from_secs(30))),
        ],
        Duration::from_secs(1),
    );

    let delays = group.probe_all(&CancellationToken::new(), URL).await.unwrap();
    assert_eq!(delays.len(), 2);
    assert_eq!(delays["HK-01"], Duration::from_millis(120));
    assert_eq!(delays["JP-01"], Duration::from_millis(300));
    assert!(!delays.contains_key("US-01"));
}

#[tokio::test(start_paused = true)]
async fn test_all_timeouts_report_failure() {
    let group = group(
        vec![
            MockBackend::new("HK-01", Reply::Hang),
            MockBackend::new("JP-01", Reply::Hang),
            MockBackend::new("US-01", Reply::After(Duration::from_secs(10))),
        ],
        Duration::from_secs(1),
    );

    let err = group.probe_all(&CancellationToken::new(), URL).await.unwrap_err();
    assert!(matches!(err, GroupError::AllProbesFailed { attempted: 3, .. }));
}

#[tokio::test]
async fn test_failed_probes_are_omitted() {
    let group = group(
        vec![
            MockBackend::new("HK-01", Reply::Fail),
            MockBackend::new("JP-01", Reply::After(Duration::from_millis(5))),
        ],
        Duration::from_secs(1),
    );

    let delays = group.probe_all(&CancellationToken::new(), URL).await.unwrap();
    assert_eq!(delays.keys().collect::<Vec<_>>(), vec!["JP-01"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_releases_barrier() {
    let group = Arc::new(group(
        vec![
            MockBackend::new("HK-01", Reply::Hang),
            MockBackend::new("JP-01", Reply::Hang),
        ],
        Duration::from_secs(3600),
    ));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let result = group.probe_all(&cancel, URL).await;
    assert!(matches!(result, Err(GroupError::AllProbesFailed { .. })));
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_fallback_only_group_reports_failure() {
    // Zero configured backends resolve to the fallback, which cannot be probed.
    let group = group(Vec::new(), Duration::from_secs(1));
    let err = group.probe_all(&CancellationToken::new(), URL).await.unwrap_err();
    assert!(matches!(err, GroupError::AllProbesFailed { attempted: 1, .. }));
}
