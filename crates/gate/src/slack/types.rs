//! Slack Block Kit and API payload types.
//!
//! These types represent the subset of the Slack Block Kit reference and
//! Web API responses the approval gate needs: request/decision messages,
//! interaction payloads from button clicks, and Socket Mode envelopes.
//!
//! See: <https://api.slack.com/block-kit>

use approval_gate_core::ActionEvent;
use serde::{Deserialize, Serialize};

use super::error::SlackError;
use crate::notifier::MessageHandle;

/// A Slack message with blocks.
#[derive(Debug, Clone, Serialize)]
pub struct SlackMessage {
    /// Channel ID to post to.
    pub channel: String,
    /// Message blocks.
    pub blocks: Vec<Block>,
    /// Optional plain text fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Parent message timestamp when replying in a thread.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

/// Block Kit block types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Section block with text and/or a list of fields.
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<Text>>,
    },
    /// Context block with small muted text.
    Context { elements: Vec<ContextElement> },
    /// Actions block with interactive elements.
    Actions { elements: Vec<ActionElement> },
}

impl Block {
    /// Section block with a single markdown text.
    #[must_use]
    pub fn section(text: impl Into<String>) -> Self {
        Self::Section {
            text: Some(Text::mrkdwn(text)),
            fields: None,
        }
    }

    /// Section block made of markdown fields.
    #[must_use]
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Section {
            text: None,
            fields: Some(fields.into_iter().map(Text::mrkdwn).collect()),
        }
    }
}

/// Text object types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    /// Markdown text (supports formatting).
    Mrkdwn { text: String },
}

impl Text {
    /// Create a markdown text object.
    #[must_use]
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self::Mrkdwn { text: text.into() }
    }
}

/// Plain text object (for button labels).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlainText {
    #[serde(rename = "type")]
    pub text_type: &'static str,
    pub text: String,
    pub emoji: bool,
}

impl PlainText {
    /// Create a new plain text object.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text_type: "plain_text",
            text: text.into(),
            emoji: true,
        }
    }
}

/// Context block elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContextElement {
    /// Markdown text in context.
    Mrkdwn { text: String },
}

/// Action block elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionElement {
    /// Interactive button.
    Button {
        text: PlainText,
        action_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        style: Option<ButtonStyle>,
    },
}

/// Button style (affects color).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    /// Green primary button.
    Primary,
    /// Red danger button.
    Danger,
}

// =============================================================================
// Response Types
// =============================================================================

/// Response from posting a message.
#[derive(Debug, Clone, Deserialize)]
pub struct PostMessageResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID where message was posted.
    #[serde(default)]
    pub channel: Option<String>,
    /// Message timestamp (unique ID).
    #[serde(default)]
    pub ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from updating a message.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMessageResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// Channel ID.
    #[serde(default)]
    pub channel: Option<String>,
    /// Updated message timestamp.
    #[serde(default)]
    pub ts: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

/// Response from `apps.connections.open`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionsOpenResponse {
    /// Whether the request was successful.
    pub ok: bool,
    /// WebSocket URL for this Socket Mode connection.
    #[serde(default)]
    pub url: Option<String>,
    /// Error message if not ok.
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Interaction Types
// =============================================================================

/// Interaction type for button clicks inside messages.
pub const BLOCK_ACTIONS: &str = "block_actions";

/// Slack interaction payload from button clicks.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    /// Type of interaction.
    #[serde(rename = "type")]
    pub interaction_type: String,
    /// User who triggered the interaction.
    pub user: InteractionUser,
    /// Container information.
    #[serde(default)]
    pub container: Option<InteractionContainer>,
    /// Channel where interaction occurred.
    #[serde(default)]
    pub channel: Option<InteractionChannel>,
    /// Actions that were triggered.
    #[serde(default)]
    pub actions: Vec<InteractionAction>,
}

impl InteractionPayload {
    /// Button presses carried by this payload, in order.
    ///
    /// Payloads other than `block_actions` carry none.
    #[must_use]
    pub fn action_events(&self) -> Vec<ActionEvent> {
        if self.interaction_type != BLOCK_ACTIONS {
            return Vec::new();
        }

        self.actions
            .iter()
            .map(|action| {
                ActionEvent::new(
                    action.action_id.as_str(),
                    action.value.as_deref().unwrap_or_default(),
                    self.user.id.as_str(),
                )
            })
            .collect()
    }

    /// Handle of the message the buttons were attached to, if Slack sent it.
    #[must_use]
    pub fn message_handle(&self) -> Option<MessageHandle> {
        let container = self.container.as_ref()?;
        let ts = container.message_ts.clone()?;
        let channel = container
            .channel_id
            .clone()
            .or_else(|| self.channel.as_ref().map(|c| c.id.clone()))?;
        Some(MessageHandle { channel, ts })
    }
}

/// User who triggered an interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionUser {
    /// Slack user ID.
    pub id: String,
    /// Username.
    #[serde(default)]
    pub username: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Container for the interaction.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionContainer {
    /// Container type (e.g., "message").
    #[serde(rename = "type")]
    pub container_type: String,
    /// Message timestamp.
    #[serde(default)]
    pub message_ts: Option<String>,
    /// Channel ID.
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// Channel where interaction occurred.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionChannel {
    /// Channel ID.
    pub id: String,
    /// Channel name.
    #[serde(default)]
    pub name: Option<String>,
}

/// Action that was triggered.
#[derive(Debug, Clone, Deserialize)]
pub struct InteractionAction {
    /// Action ID (set when creating the button).
    pub action_id: String,
    /// Block ID containing this action.
    #[serde(default)]
    pub block_id: Option<String>,
    /// Value attached to the action.
    #[serde(default)]
    pub value: Option<String>,
    /// Action type.
    #[serde(rename = "type", default)]
    pub action_type: String,
}

// =============================================================================
// Socket Mode
// =============================================================================

/// A frame received over a Socket Mode connection.
///
/// See: <https://api.slack.com/apis/socket-mode>
#[derive(Debug, Clone, Deserialize)]
pub struct SocketEnvelope {
    /// `hello`, `disconnect`, `interactive`, `events_api`, ...
    #[serde(rename = "type")]
    pub envelope_type: String,
    /// Present on every frame that must be acknowledged.
    #[serde(default)]
    pub envelope_id: Option<String>,
    /// Event body for `interactive` and `events_api` frames.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
    /// Why the server is closing the connection (`disconnect` only).
    #[serde(default)]
    pub reason: Option<String>,
}

impl SocketEnvelope {
    /// Parse a text frame.
    ///
    /// # Errors
    ///
    /// Returns error if the frame is not a valid envelope.
    pub fn parse(text: &str) -> Result<Self, SlackError> {
        serde_json::from_str(text).map_err(|e| SlackError::InvalidPayload(e.to_string()))
    }

    #[must_use]
    pub fn is_hello(&self) -> bool {
        self.envelope_type == "hello"
    }

    #[must_use]
    pub fn is_disconnect(&self) -> bool {
        self.envelope_type == "disconnect"
    }

    /// Acknowledgement frame for this envelope, if it needs one.
    #[must_use]
    pub fn ack(&self) -> Option<String> {
        self.envelope_id
            .as_ref()
            .map(|id| serde_json::json!({ "envelope_id": id }).to_string())
    }

    /// Interaction payload of an `interactive` envelope.
    ///
    /// # Errors
    ///
    /// Returns error if the payload does not parse as an interaction.
    pub fn interaction(&self) -> Result<Option<InteractionPayload>, SlackError> {
        if self.envelope_type != "interactive" {
            return Ok(None);
        }
        let Some(payload) = &self.payload else {
            return Ok(None);
        };
        serde_json::from_value(payload.clone())
            .map(Some)
            .map_err(|e| SlackError::InvalidPayload(e.to_string()))
    }
}
