//! Shared fixtures for the approval gate integration tests.
//!
//! # Test Categories
//!
//! - `gate_messages` - Block Kit content of the request
//! - `gate_run` - Quorum state machine properties
//! - `gate_coordinator` - End-to-end runs against a recording notifier
//! - `gate_interactions` - The signed HTTP interactions endpoint
//! - `gate_slack_client` - Web API calls against a local mock server
//! - `gate_socket_mode` - The Socket Mode listener against local mock servers

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use approval_gate::config::RunContext;
use approval_gate::notifier::{MessageHandle, Notifier};
use approval_gate::slack::{Block, SlackError};
use approval_gate_core::{ActionEvent, ApprovalRun, Intent, action_id};
use hmac::{Hmac, Mac};
use sha2::Sha256;

/// Signing secret used by every signed-request fixture.
pub const SIGNING_SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";

/// Channel the fixtures post to.
pub const CHANNEL: &str = "C0APPROVALS";

/// One call made against a [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// Top-level post.
    Post {
        handle: MessageHandle,
        blocks: Vec<Block>,
    },
    /// Thread reply.
    Threaded {
        parent: MessageHandle,
        handle: MessageHandle,
        blocks: Vec<Block>,
    },
    /// Message edit.
    Update {
        handle: MessageHandle,
        blocks: Vec<Block>,
    },
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<Call>,
    next_ts: u32,
    fail_posts_after: Option<usize>,
    update_delay: Option<Duration>,
}

/// In-memory notifier that records every call in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every post after the first `count` succeed.
    #[must_use]
    pub fn failing_posts_after(count: usize) -> Self {
        let notifier = Self::default();
        notifier.lock().fail_posts_after = Some(count);
        notifier
    }

    /// Take `delay` to complete every message edit.
    #[must_use]
    pub fn with_update_delay(delay: Duration) -> Self {
        let notifier = Self::default();
        notifier.lock().update_delay = Some(delay);
        notifier
    }

    /// Every call so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Only the edits, in order.
    #[must_use]
    pub fn updates(&self) -> Vec<(MessageHandle, Vec<Block>)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Update { handle, blocks } => Some((handle.clone(), blocks.clone())),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_post(
        &self,
        channel: &str,
        parent: Option<&MessageHandle>,
        blocks: Vec<Block>,
    ) -> Result<MessageHandle, SlackError> {
        let mut recorded = self.lock();
        let posts = recorded
            .calls
            .iter()
            .filter(|call| !matches!(call, Call::Update { .. }))
            .count();
        if recorded.fail_posts_after.is_some_and(|limit| posts >= limit) {
            return Err(SlackError::Api("rate_limited".to_string()));
        }

        recorded.next_ts += 1;
        let handle = MessageHandle {
            channel: channel.to_string(),
            ts: format!("1700000000.{:06}", recorded.next_ts),
        };
        let call = match parent {
            Some(parent) => Call::Threaded {
                parent: parent.clone(),
                handle: handle.clone(),
                blocks,
            },
            None => Call::Post {
                handle: handle.clone(),
                blocks,
            },
        };
        recorded.calls.push(call);
        Ok(handle)
    }
}

impl Notifier for RecordingNotifier {
    async fn post(
        &self,
        channel: &str,
        blocks: Vec<Block>,
        _fallback_text: &str,
    ) -> Result<MessageHandle, SlackError> {
        self.record_post(channel, None, blocks)
    }

    async fn post_threaded(
        &self,
        parent: &MessageHandle,
        blocks: Vec<Block>,
        _fallback_text: &str,
    ) -> Result<MessageHandle, SlackError> {
        self.record_post(&parent.channel, Some(parent), blocks)
    }

    async fn update(&self, message: &MessageHandle, blocks: Vec<Block>) -> Result<(), SlackError> {
        let delay = self.lock().update_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.lock().calls.push(Call::Update {
            handle: message.clone(),
            blocks,
        });
        Ok(())
    }
}

/// Install the TLS crypto provider the binary uses, once per process.
pub fn install_crypto_provider() {
    // Already installed by another test in this binary.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// A filled-in run context.
#[must_use]
pub fn run_context() -> RunContext {
    RunContext {
        actor: "octocat".to_string(),
        workflow: "Deploy".to_string(),
        run_url: "https://github.com/acme/app/actions/runs/42".to_string(),
        environment: "production".to_string(),
        url: "https://app.example.com".to_string(),
        reason: "release v1.2.3".to_string(),
    }
}

/// A genuine button press for `slot` on `run`.
#[must_use]
pub fn click(run: &ApprovalRun, intent: Intent, slot: usize, user_id: &str) -> ActionEvent {
    ActionEvent::new(
        action_id(intent, slot),
        run.tokens().for_intent(intent),
        user_id,
    )
}

/// Current Unix time as a Slack request timestamp.
#[must_use]
pub fn now_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// `v0=` signature for `body` under [`SIGNING_SECRET`], computed
/// independently of the gate's own implementation.
#[must_use]
pub fn sign(timestamp: &str, body: &str) -> String {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(SIGNING_SECRET.as_bytes()) else {
        return String::new();
    };
    mac.update(format!("v0:{timestamp}:{body}").as_bytes());
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}

/// Form body Slack sends for a single button press.
#[must_use]
pub fn interaction_body(action_id: &str, value: &str, user_id: &str) -> String {
    let payload = interaction_payload(action_id, value, user_id);
    format!("payload={}", urlencoding::encode(&payload.to_string()))
}

/// `block_actions` payload for a single button press.
#[must_use]
pub fn interaction_payload(action_id: &str, value: &str, user_id: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "block_actions",
        "user": { "id": user_id, "name": "Jane Doe" },
        "container": {
            "type": "message",
            "message_ts": "1700000000.000002",
            "channel_id": CHANNEL
        },
        "channel": { "id": CHANNEL },
        "actions": [{
            "type": "button",
            "action_id": action_id,
            "block_id": "b1",
            "value": value
        }]
    })
}
