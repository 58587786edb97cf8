//! End-to-end resolution through the HTTP resource client.

use std::sync::Arc;
use std::time::Duration;

use obs_resolver::resolver::{Hop, ManualClock, ReferenceCache};
use obs_resolver::{ChainResolver, HttpResourceClient, ResolveError};

mod common;

fn resolver_for(
    addr: std::net::SocketAddr,
    clock: ManualClock,
) -> ChainResolver<ManualClock> {
    let http = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let client = HttpResourceClient::with_client(http, &format!("http://{}", addr)).unwrap();
    ChainResolver::with_cache(
        Arc::new(client),
        ReferenceCache::with_clock(Duration::from_secs(300), clock),
    )
}

#[tokio::test]
async fn test_environment_resolution_is_cached() {
    let (addr, log) = common::start_programmable_backend(|req| async move {
        match req.path.as_str() {
            "/api/v1/namespaces/org-1/environments/dev" => (
                200,
                r#"{"spec":{"dataPlaneRef":{"kind":"DataPlane","name":"primary"}}}"#.to_string(),
            ),
            "/api/v1/namespaces/org-1/dataplanes/primary" => (
                200,
                r#"{"spec":{"observabilityPlaneRef":{"kind":"ObservabilityPlane","name":"obs-1"}}}"#
                    .to_string(),
            ),
            "/api/v1/namespaces/org-1/observabilityplanes/obs-1" => (
                200,
                r#"{"spec":{"observerURL":"https://observer.example.com"}}"#.to_string(),
            ),
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let clock = ManualClock::new();
    let resolver = resolver_for(addr, clock.clone());

    let first = resolver
        .resolve_for_environment("org-1", "dev", Some("t"))
        .await
        .unwrap();
    assert_eq!(first.observer_url.as_deref(), Some("https://observer.example.com"));
    assert_eq!(first.rca_agent_url, None);
    assert_eq!(log.lock().unwrap().len(), 3);

    let second = resolver
        .resolve_for_environment("org-1", "dev", Some("t"))
        .await
        .unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(log.lock().unwrap().len(), 3);

    clock.advance(Duration::from_secs(300));
    resolver
        .resolve_for_environment("org-1", "dev", Some("t"))
        .await
        .unwrap();
    assert_eq!(log.lock().unwrap().len(), 6);
}

#[tokio::test]
async fn test_build_fallback_over_http() {
    let (addr, log) = common::start_programmable_backend(|req| async move {
        match req.path.as_str() {
            "/api/v1/namespaces/org-1/projects/shop" => (200, r#"{"spec":{}}"#.to_string()),
            "/api/v1/clusterbuildplanes/default" => (200, r#"{"spec":{}}"#.to_string()),
            "/api/v1/clusterobservabilityplanes/default" => (
                200,
                r#"{"spec":{"observerURL":"http://build-observer","rcaAgentURL":"http://rca"}}"#
                    .to_string(),
            ),
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let resolver = resolver_for(addr, ManualClock::new());
    let urls = resolver.resolve_for_build("org-1", "shop", None).await.unwrap();
    assert_eq!(urls.observer_url.as_deref(), Some("http://build-observer"));
    assert_eq!(urls.rca_agent_url.as_deref(), Some("http://rca"));

    let paths: Vec<_> = log.lock().unwrap().iter().map(|r| r.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            "/api/v1/namespaces/org-1/projects/shop",
            "/api/v1/namespaces/org-1/buildplanes/default",
            "/api/v1/clusterbuildplanes/default",
            "/api/v1/clusterobservabilityplanes/default",
        ]
    );
}

#[tokio::test]
async fn test_explicit_missing_cluster_build_plane_fails() {
    let (addr, log) = common::start_programmable_backend(|req| async move {
        match req.path.as_str() {
            "/api/v1/namespaces/org-1/projects/shop" => (
                200,
                r#"{"spec":{"buildPlaneRef":{"kind":"ClusterBuildPlane","name":"shared"}}}"#
                    .to_string(),
            ),
            _ => (404, "{}".to_string()),
        }
    })
    .await;

    let resolver = resolver_for(addr, ManualClock::new());
    let err = resolver.resolve_for_build("org-1", "shop", None).await.unwrap_err();
    assert!(matches!(err, ResolveError::NotFound { hop: Hop::BuildPlane, .. }));
    assert_eq!(log.lock().unwrap().len(), 2);
    assert!(resolver.cache().is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_retried_on_next_call() {
    let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter = calls.clone();
    let (addr, _log) = common::start_programmable_backend(move |req| {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            match req.path.as_str() {
                _ if n == 0 => (502, "upstream".to_string()),
                "/api/v1/namespaces/org-1/environments/dev" => (200, r#"{"spec":{}}"#.to_string()),
                "/api/v1/namespaces/org-1/dataplanes/default" => (200, r#"{"spec":{}}"#.to_string()),
                "/api/v1/namespaces/org-1/observabilityplanes/default" => {
                    (200, r#"{"spec":{}}"#.to_string())
                }
                _ => (404, "{}".to_string()),
            }
        }
    })
    .await;

    let resolver = resolver_for(addr, ManualClock::new());
    let err = resolver.resolve_for_environment("org-1", "dev", None).await.unwrap_err();
    assert!(matches!(err, ResolveError::Transport { hop: Hop::Environment, .. }));

    let urls = resolver.resolve_for_environment("org-1", "dev", None).await.unwrap();
    assert!(!urls.is_configured());
}
