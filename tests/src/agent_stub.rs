//! Scripted in-process custody agent.
//!
//! The stub answers raw wire frames built with `serde_json::json!` rather
//! than the library's own serde impls, so the tests also pin the wire shape
//! itself: `{ id, operation, payload }` out, `{ id, ok, result | error }` and
//! `{ kind, origin?, detail }` back.

use serde_json::{json, Value};
use signer_provider::channel::AgentEndpoint;
use signer_provider::{ProviderConfig, SignerProvider};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Build a success response frame.
pub fn response_ok(id: &str, result: Value) -> Value {
    json!({ "id": id, "ok": true, "result": result })
}

/// Build a failure response frame.
pub fn response_err(id: &str, code: i32, message: &str) -> Value {
    json!({ "id": id, "ok": false, "error": { "code": code, "message": message } })
}

/// Build a notification frame.
pub fn notification(kind: &str, origin: Option<&str>, detail: &str) -> Value {
    match origin {
        Some(origin) => json!({ "kind": kind, "origin": origin, "detail": detail }),
        None => json!({ "kind": kind, "detail": detail }),
    }
}

/// Build the JSON `detail` string for a wallet-state snapshot.
pub fn state_detail(is_locked: bool, is_connected: bool, active_key: Option<&str>) -> String {
    let mut state = json!({ "isLocked": is_locked, "isConnected": is_connected });
    if let Some(key) = active_key {
        state["activeKey"] = json!(key);
    }
    state.to_string()
}

/// Extract the request id string from an outbound frame.
pub fn request_id(frame: &Value) -> String {
    frame["id"].as_str().expect("request frame has id").to_string()
}

/// Extract the operation name from an outbound frame.
pub fn operation(frame: &Value) -> String {
    frame["operation"]
        .as_str()
        .expect("request frame has operation")
        .to_string()
}

/// Spawn a provider wired to a fresh in-process agent endpoint.
pub fn provider_fixture(timeout: Duration) -> (Arc<SignerProvider>, AgentEndpoint) {
    let (channel, inbound, endpoint) = signer_provider::channel::paired(64);
    let provider = SignerProvider::new(
        ProviderConfig::with_timeout(timeout),
        Arc::new(channel),
        inbound,
    )
    .expect("valid config");
    (Arc::new(provider), endpoint)
}

/// Spawn a scripted agent: every incoming request is fed to `script`, and
/// each returned frame is pushed back over the inbound channel.
///
/// The task ends (returning the endpoint) when the provider side is dropped.
pub fn spawn_agent<F>(mut endpoint: AgentEndpoint, mut script: F) -> JoinHandle<AgentEndpoint>
where
    F: FnMut(&Value) -> Vec<Value> + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(request) = endpoint.requests.recv().await {
            for frame in script(&request) {
                if endpoint.inbound.send(frame).await.is_err() {
                    return endpoint;
                }
            }
        }
        endpoint
    })
}
