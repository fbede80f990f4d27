//! Integration tests for the Slack Web API client.
//!
//! A local axum server stands in for `slack.com/api` and records what the
//! client sends.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use approval_gate::notifier::{MessageHandle, Notifier};
use approval_gate::slack::{Block, SlackClient, SlackError};
use approval_gate_integration_tests::{CHANNEL, install_crypto_provider};
use axum::{Json, Router, extract::State, http::HeaderMap, routing::post};
use secrecy::SecretString;
use serde_json::{Value, json};

#[derive(Clone, Default)]
struct MockSlack {
    requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
}

impl MockSlack {
    fn record(&self, method: &str, headers: &HeaderMap, body: Value) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        self.requests
            .lock()
            .expect("lock")
            .push((method.to_string(), auth, body));
    }

    fn requests(&self) -> Vec<(String, Option<String>, Value)> {
        self.requests.lock().expect("lock").clone()
    }
}

async fn post_message(
    State(mock): State<MockSlack>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.record("chat.postMessage", &headers, body.clone());
    if body["channel"] == "C_MISSING" {
        return Json(json!({ "ok": false, "error": "channel_not_found" }));
    }
    let ts = if body.get("thread_ts").is_some() {
        "1700000000.000200"
    } else {
        "1700000000.000100"
    };
    Json(json!({ "ok": true, "channel": body["channel"].clone(), "ts": ts }))
}

async fn update(
    State(mock): State<MockSlack>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    mock.record("chat.update", &headers, body.clone());
    Json(json!({
        "ok": true,
        "channel": body["channel"].clone(),
        "ts": body["ts"].clone()
    }))
}

async fn connections_open(State(mock): State<MockSlack>, headers: HeaderMap) -> Json<Value> {
    mock.record("apps.connections.open", &headers, Value::Null);
    Json(json!({ "ok": true, "url": "wss://wss-primary.slack.com/link/?ticket=abc" }))
}

async fn spawn_mock() -> (SocketAddr, MockSlack) {
    let mock = MockSlack::default();
    let app = Router::new()
        .route("/api/chat.postMessage", post(post_message))
        .route("/api/chat.update", post(update))
        .route("/api/apps.connections.open", post(connections_open))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    (addr, mock)
}

fn client(addr: SocketAddr) -> SlackClient {
    install_crypto_provider();
    SlackClient::new(SecretString::from("xoxb-test".to_string()))
        .with_api_base(format!("http://{addr}/api/"))
}

#[tokio::test]
async fn test_post_and_thread_reply() {
    let (addr, mock) = spawn_mock().await;
    let slack = client(addr);

    let summary = slack
        .post(CHANNEL, vec![Block::section("summary")], "fallback")
        .await
        .expect("posted");
    assert_eq!(
        summary,
        MessageHandle {
            channel: CHANNEL.to_string(),
            ts: "1700000000.000100".to_string(),
        }
    );

    let reply = slack
        .post_threaded(&summary, vec![Block::section("prompt")], "fallback")
        .await
        .expect("posted");
    assert_eq!(reply.ts, "1700000000.000200");

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    let (method, auth, body) = &requests[0];
    assert_eq!(method, "chat.postMessage");
    assert_eq!(auth.as_deref(), Some("Bearer xoxb-test"));
    assert_eq!(body["text"], "fallback");
    assert_eq!(body["blocks"][0]["type"], "section");
    assert!(body.get("thread_ts").is_none());

    let (_, _, body) = &requests[1];
    assert_eq!(body["thread_ts"], "1700000000.000100");
}

#[tokio::test]
async fn test_update_replaces_blocks() {
    let (addr, mock) = spawn_mock().await;
    let slack = client(addr);
    let handle = MessageHandle {
        channel: CHANNEL.to_string(),
        ts: "1700000000.000200".to_string(),
    };

    slack
        .update(&handle, vec![Block::section("Approved by <@U1>")])
        .await
        .expect("updated");

    let requests = mock.requests();
    let (method, _, body) = requests.first().expect("request");
    assert_eq!(method, "chat.update");
    assert_eq!(body["ts"], "1700000000.000200");
    assert_eq!(body["blocks"][0]["text"]["text"], "Approved by <@U1>");
}

#[tokio::test]
async fn test_api_error_surfaces() {
    let (addr, _mock) = spawn_mock().await;
    let slack = client(addr);

    let result = slack
        .post("C_MISSING", vec![Block::section("summary")], "fallback")
        .await;
    assert!(matches!(result, Err(SlackError::Api(e)) if e == "channel_not_found"));
}

#[tokio::test]
async fn test_socket_url_uses_app_token() {
    let (addr, mock) = spawn_mock().await;
    let slack = client(addr).with_app_token(SecretString::from("xapp-test".to_string()));

    let url = slack.open_socket_connection().await.expect("url");
    assert!(url.starts_with("wss://"));

    let requests = mock.requests();
    let (_, auth, _) = requests.first().expect("request");
    assert_eq!(auth.as_deref(), Some("Bearer xapp-test"));
}

#[tokio::test]
async fn test_unreachable_api_is_request_error() {
    let slack = client("127.0.0.1:9".parse().expect("addr"));

    let result = slack
        .post(CHANNEL, vec![Block::section("summary")], "fallback")
        .await;
    assert!(matches!(result, Err(SlackError::Request(_))));
}
