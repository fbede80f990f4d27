//! Outbound messaging capability used by the coordinator.
//!
//! The coordinator only needs to post, reply in a thread, and replace a
//! message's blocks. [`SlackClient`] implements this against the Web API;
//! tests substitute an in-memory recorder.

use std::future::Future;

use crate::slack::{Block, SlackClient, SlackError};

/// Address of a posted message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageHandle {
    /// Channel ID.
    pub channel: String,
    /// Message timestamp (unique within the channel).
    pub ts: String,
}

/// Posts and edits messages on the chat platform.
pub trait Notifier: Send + Sync {
    /// Post a top-level message.
    fn post(
        &self,
        channel: &str,
        blocks: Vec<Block>,
        fallback_text: &str,
    ) -> impl Future<Output = Result<MessageHandle, SlackError>> + Send;

    /// Post a reply in the thread of `parent`.
    fn post_threaded(
        &self,
        parent: &MessageHandle,
        blocks: Vec<Block>,
        fallback_text: &str,
    ) -> impl Future<Output = Result<MessageHandle, SlackError>> + Send;

    /// Replace the blocks of an existing message.
    fn update(
        &self,
        message: &MessageHandle,
        blocks: Vec<Block>,
    ) -> impl Future<Output = Result<(), SlackError>> + Send;
}

impl Notifier for SlackClient {
    async fn post(
        &self,
        channel: &str,
        blocks: Vec<Block>,
        fallback_text: &str,
    ) -> Result<MessageHandle, SlackError> {
        let response = self
            .post_message(channel, blocks, Some(fallback_text), None)
            .await?;
        handle_from(response.channel, response.ts, channel)
    }

    async fn post_threaded(
        &self,
        parent: &MessageHandle,
        blocks: Vec<Block>,
        fallback_text: &str,
    ) -> Result<MessageHandle, SlackError> {
        let response = self
            .post_message(&parent.channel, blocks, Some(fallback_text), Some(&parent.ts))
            .await?;
        handle_from(response.channel, response.ts, &parent.channel)
    }

    async fn update(&self, message: &MessageHandle, blocks: Vec<Block>) -> Result<(), SlackError> {
        self.update_message(&message.channel, &message.ts, blocks, None)
            .await
            .map(|_| ())
    }
}

/// Build a handle from a post response, falling back to the requested
/// channel when Slack omits it.
fn handle_from(
    channel: Option<String>,
    ts: Option<String>,
    requested_channel: &str,
) -> Result<MessageHandle, SlackError> {
    let ts = ts.ok_or_else(|| SlackError::Response("chat.postMessage returned no ts".into()))?;
    Ok(MessageHandle {
        channel: channel.unwrap_or_else(|| requested_channel.to_string()),
        ts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_from_prefers_response_channel() {
        let handle = handle_from(Some("C2".into()), Some("1.2".into()), "C1").expect("handle");
        assert_eq!(handle.channel, "C2");
        assert_eq!(handle.ts, "1.2");
    }

    #[test]
    fn test_handle_from_falls_back_to_requested_channel() {
        let handle = handle_from(None, Some("1.2".into()), "C1").expect("handle");
        assert_eq!(handle.channel, "C1");
    }

    #[test]
    fn test_handle_from_requires_ts() {
        assert!(matches!(
            handle_from(Some("C1".into()), None, "C1"),
            Err(SlackError::Response(_))
        ));
    }
}
