//! Full operation round-trips against the scripted agent.

use crate::agent_stub::{
    notification, operation, provider_fixture, request_id, response_err, response_ok, spawn_agent,
    state_detail,
};
use crate::init_tracing;
use bridge_bus::{EventFilter, EventKind};
use serde_json::json;
use signer_provider::channel::paired;
use signer_provider::{ConfigError, ProviderConfig, ProviderError, SignerProvider};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

/// Connection approval: the call resolves true and the agent's connected
/// notification reaches the site's subscriber.
#[tokio::test]
async fn request_connection_with_notification() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));
    let mut sub = provider.subscribe(EventFilter::for_origin("https://dapp.example"));

    let agent = spawn_agent(endpoint, |frame| {
        assert_eq!(operation(frame), "requestConnection");
        vec![
            response_ok(&request_id(frame), json!(true)),
            notification(
                "signer:connected",
                Some("https://dapp.example"),
                &state_detail(false, true, Some("0203ab")),
            ),
        ]
    });

    assert!(provider.request_connection().await.unwrap());

    let event = timeout(Duration::from_millis(500), sub.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.kind, EventKind::Connected);
    assert!(event.state().unwrap().is_connected);
    drop(provider);
    agent.await.unwrap();
}

/// Disconnect resolves true and emits the site-scoped disconnected event.
#[tokio::test]
async fn disconnect_round_trip() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));
    let mut sub = provider.subscribe(EventFilter::for_origin("https://dapp.example"));

    let agent = spawn_agent(endpoint, |frame| {
        assert_eq!(operation(frame), "disconnectFromSite");
        vec![
            response_ok(&request_id(frame), json!(true)),
            notification(
                "signer:disconnected",
                Some("https://dapp.example"),
                &state_detail(false, false, None),
            ),
        ]
    });

    assert!(provider.disconnect_from_site().await.unwrap());
    let event = timeout(Duration::from_millis(500), sub.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.kind, EventKind::Disconnected);
    drop(provider);
    agent.await.unwrap();
}

/// Queries against a locked wallet surface the typed locked error, never a
/// falsy placeholder value.
#[tokio::test]
async fn queries_while_locked_are_errors() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    let agent = spawn_agent(endpoint, |frame| {
        vec![response_err(&request_id(frame), 1, "wallet is locked")]
    });

    assert_eq!(provider.is_connected().await.unwrap_err(), ProviderError::Locked);
    assert_eq!(
        provider.get_active_public_key().await.unwrap_err(),
        ProviderError::Locked
    );
    drop(provider);
    agent.await.unwrap();
}

/// An unlocked but unapproved account maps code 2 onto NotApproved.
#[tokio::test]
async fn active_key_for_unapproved_account() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    let agent = spawn_agent(endpoint, |frame| {
        assert_eq!(operation(frame), "getActivePublicKey");
        vec![response_err(&request_id(frame), 2, "not approved")]
    });

    let err = provider.get_active_public_key().await.unwrap_err();
    assert_eq!(err, ProviderError::NotApproved);
    assert_eq!(err.code(), Some(2));
    drop(provider);
    agent.await.unwrap();
}

/// The happy-path account queries.
#[tokio::test]
async fn account_queries_round_trip() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    let agent = spawn_agent(endpoint, |frame| {
        let id = request_id(frame);
        match operation(frame).as_str() {
            "getActivePublicKey" => vec![response_ok(&id, json!("0203deadbeef"))],
            "getVersion" => vec![response_ok(&id, json!("1.4.12"))],
            "requestSwitchAccount" => vec![response_ok(&id, json!(true))],
            other => panic!("unexpected operation {other}"),
        }
    });

    assert_eq!(provider.get_active_public_key().await.unwrap(), "0203deadbeef");
    assert_eq!(provider.get_version().await.unwrap(), "1.4.12");
    assert!(provider.request_switch_account().await.unwrap());
    drop(provider);
    agent.await.unwrap();
}

/// Detached agent fails every operation immediately, without consuming the
/// timeout window.
#[tokio::test]
async fn detached_agent_fails_fast() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(30));
    endpoint.set_attached(false);

    let started = std::time::Instant::now();
    assert_eq!(
        provider.request_connection().await.unwrap_err(),
        ProviderError::AgentUnavailable
    );
    assert_eq!(
        provider.sign("deploy", "0203ab").await.unwrap_err(),
        ProviderError::AgentUnavailable
    );
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(provider.pending_count(), 0);
}

/// Re-attachment is observed per call: the same provider recovers once the
/// agent flips back.
#[tokio::test]
async fn reattached_agent_recovers() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    endpoint.set_attached(false);
    assert_eq!(
        provider.get_version().await.unwrap_err(),
        ProviderError::AgentUnavailable
    );

    endpoint.set_attached(true);
    let agent = spawn_agent(endpoint, |frame| {
        vec![response_ok(&request_id(frame), json!("1.5.0"))]
    });
    assert_eq!(provider.get_version().await.unwrap(), "1.5.0");
    drop(provider);
    agent.await.unwrap();
}

/// Zero durations and capacities are rejected at construction.
#[tokio::test]
async fn config_validation_rejects_zeros() {
    init_tracing();

    let build = |config: ProviderConfig| {
        let (channel, inbound, _endpoint) = paired(8);
        SignerProvider::new(config, Arc::new(channel), inbound).map(|_| ())
    };

    let config = ProviderConfig {
        request_timeout_ms: 0,
        ..ProviderConfig::default()
    };
    assert_eq!(build(config).unwrap_err(), ConfigError::ZeroTimeout);

    let config = ProviderConfig {
        channel_capacity: 0,
        ..ProviderConfig::default()
    };
    assert_eq!(build(config).unwrap_err(), ConfigError::ZeroCapacity);

    let config = ProviderConfig {
        cleanup_interval_ms: 0,
        ..ProviderConfig::default()
    };
    assert_eq!(build(config).unwrap_err(), ConfigError::ZeroCleanupInterval);

    assert!(build(ProviderConfig::default()).is_ok());
}

/// Store statistics account for every resolution path: a served call counts
/// as completed, a caller-observed timeout as a timeout, never as a
/// cancellation.
#[tokio::test]
async fn pending_stats_account_for_outcomes() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_millis(100));

    // One completed, one timed out.
    let agent = spawn_agent(endpoint, |frame| match operation(frame).as_str() {
        "getVersion" => vec![response_ok(&request_id(frame), json!("1.0.0"))],
        _ => Vec::new(), // leave it to time out
    });

    assert_eq!(provider.get_version().await.unwrap(), "1.0.0");
    assert!(matches!(
        provider.is_connected().await.unwrap_err(),
        ProviderError::Timeout { .. }
    ));

    let stats = provider.stats();
    assert_eq!(stats.total_registered.load(Ordering::Relaxed), 2);
    assert_eq!(stats.total_completed.load(Ordering::Relaxed), 1);
    assert_eq!(stats.total_timeouts.load(Ordering::Relaxed), 1);
    assert_eq!(stats.total_cancelled.load(Ordering::Relaxed), 0);
    assert_eq!(provider.pending_count(), 0);
    drop(provider);
    agent.await.unwrap();
}

/// Explicit shutdown rejects outstanding calls and leaves nothing pending.
#[tokio::test]
async fn shutdown_tears_down_cleanly() {
    init_tracing();
    let (provider, mut endpoint) = provider_fixture(Duration::from_secs(30));

    let call = {
        let provider = provider.clone();
        tokio::spawn(async move { provider.get_version().await })
    };
    // Wait until the request is registered and sent.
    let _frame = timeout(Duration::from_secs(1), endpoint.requests.recv())
        .await
        .unwrap()
        .unwrap();

    provider.shutdown();

    let err = timeout(Duration::from_secs(1), call)
        .await
        .unwrap()
        .unwrap()
        .unwrap_err();
    assert_eq!(err, ProviderError::ChannelClosed);
    assert_eq!(provider.pending_count(), 0);
}
