//! Slack integration for the approval gate.
//!
//! This module provides:
//! - [`SlackClient`] for posting and updating messages
//! - Block Kit types for building rich messages
//! - Message builders for the request, prompts and decision records
//! - Webhook signature verification
//! - A Socket Mode listener for runners that cannot receive inbound HTTP
//!
//! # Flow
//!
//! 1. The summary is posted to the channel, one prompt per approver in its thread
//! 2. An approver clicks Approve or Reject
//! 3. The click arrives over Socket Mode or the signed interactions endpoint
//! 4. The coordinator validates it and records the decision
//! 5. The prompt is updated with who decided

mod client;
mod error;
pub mod messages;
pub mod socket;
mod types;

pub use client::{SLACK_API_BASE, SlackClient, compute_signature};
pub use error::SlackError;
pub use messages::{
    EXPIRED_TEXT, FALLBACK_TEXT, build_approver_prompt, build_decision_record,
    build_expired_record, build_request_summary, replace_prompt,
};
pub use types::{
    ActionElement, BLOCK_ACTIONS, Block, ButtonStyle, ContextElement, InteractionAction,
    InteractionPayload, InteractionUser, PlainText, PostMessageResponse, SocketEnvelope, Text,
    UpdateMessageResponse,
};
