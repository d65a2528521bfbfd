//! Notification delivery: scope rules, state payloads, malformed frames.

use crate::agent_stub::{notification, provider_fixture, state_detail};
use crate::init_tracing;
use bridge_bus::{EventFilter, EventKind};
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

const RECV_WINDOW: Duration = Duration::from_millis(500);

/// Broadcast kinds reach every subscriber; site-scoped kinds reach only the
/// subscriber registered for the event's origin.
#[tokio::test]
async fn delivery_scope_rule_across_subscribers() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    let mut site_a = provider.subscribe(EventFilter::for_origin("https://a.example"));
    let mut site_b = provider.subscribe(EventFilter::for_origin("https://b.example"));
    let mut background = provider.subscribe(EventFilter::broadcast_only());
    assert_eq!(provider.hub().subscriber_count(), 3);

    // A site-scoped connected for site A, then a broadcast locked.
    let connected_detail = state_detail(false, true, Some("0203ab"));
    endpoint
        .inbound
        .send(notification(
            "signer:connected",
            Some("https://a.example"),
            &connected_detail,
        ))
        .await
        .unwrap();
    endpoint
        .inbound
        .send(notification(
            "signer:locked",
            None,
            &state_detail(true, false, None),
        ))
        .await
        .unwrap();

    // Site A observes both, in publication order.
    let first = timeout(RECV_WINDOW, site_a.recv()).await.unwrap().unwrap();
    assert_eq!(first.kind, EventKind::Connected);
    assert_eq!(first.origin.as_deref(), Some("https://a.example"));
    let state = first.state().unwrap();
    assert!(state.is_connected);
    assert_eq!(state.active_key.as_deref(), Some("0203ab"));
    let second = timeout(RECV_WINDOW, site_a.recv()).await.unwrap().unwrap();
    assert_eq!(second.kind, EventKind::Locked);

    // Site B and the origin-less subscriber see only the broadcast.
    let only_b = timeout(RECV_WINDOW, site_b.recv()).await.unwrap().unwrap();
    assert_eq!(only_b.kind, EventKind::Locked);
    assert!(only_b.state().unwrap().is_locked);
    let only_bg = timeout(RECV_WINDOW, background.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(only_bg.kind, EventKind::Locked);
}

/// The detail payload is passed through byte-for-byte, including fields this
/// bridge does not model.
#[tokio::test]
async fn detail_passes_through_unmodified() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    let mut sub = provider.subscribe(EventFilter::broadcast_only());

    let detail = r#"{"isLocked":false,"isConnected":true,"futureField":7}"#;
    endpoint
        .inbound
        .send(notification("signer:unlocked", None, detail))
        .await
        .unwrap();

    let event = timeout(RECV_WINDOW, sub.recv()).await.unwrap().unwrap();
    assert_eq!(event.detail, detail);
    // Still parseable despite the unknown field.
    assert!(!event.state().unwrap().is_locked);
}

/// Kind filters narrow a subscription without affecting other subscribers.
#[tokio::test]
async fn kind_filter_narrows_subscription() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    let mut lock_watcher = provider.subscribe(
        EventFilter::broadcast_only().kinds(vec![EventKind::Locked, EventKind::Unlocked]),
    );

    endpoint
        .inbound
        .send(notification(
            "signer:activeKeyChanged",
            None,
            &state_detail(false, true, Some("02ff")),
        ))
        .await
        .unwrap();
    endpoint
        .inbound
        .send(notification(
            "signer:locked",
            None,
            &state_detail(true, false, None),
        ))
        .await
        .unwrap();

    // The key change is skipped; the lock event comes through.
    let event = timeout(RECV_WINDOW, lock_watcher.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.kind, EventKind::Locked);
}

/// Malformed and unknown-kind frames are dropped without disturbing either
/// the listener or later well-formed traffic.
#[tokio::test]
async fn malformed_frames_never_break_the_listener() {
    init_tracing();
    let (provider, endpoint) = provider_fixture(Duration::from_secs(5));

    let mut sub = provider.subscribe(EventFilter::broadcast_only());

    for junk in [
        json!("not an object"),
        json!(42),
        json!({ "neither": "shape" }),
        json!({ "kind": "signer:rebooted", "detail": "{}" }),
        json!({ "kind": "signer:locked" }),
        json!({ "id": 17, "ok": true }),
    ] {
        endpoint.inbound.send(junk).await.unwrap();
    }
    endpoint
        .inbound
        .send(notification(
            "signer:unlocked",
            None,
            &state_detail(false, false, None),
        ))
        .await
        .unwrap();

    let event = timeout(RECV_WINDOW, sub.recv()).await.unwrap().unwrap();
    assert_eq!(event.kind, EventKind::Unlocked);
}

/// Dropping a subscription deterministically removes it from the hub's
/// accounting.
#[tokio::test]
async fn unsubscribe_on_drop() {
    init_tracing();
    let (provider, _endpoint) = provider_fixture(Duration::from_secs(5));

    let sub = provider.subscribe(EventFilter::for_origin("https://a.example"));
    assert_eq!(provider.hub().subscriber_count(), 1);
    drop(sub);
    assert_eq!(provider.hub().subscriber_count(), 0);
}
