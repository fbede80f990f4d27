//! Slack message builders for the approval request flow.
//!
//! Provides factory functions for building Block Kit messages for:
//! - The top-level request summary
//! - One threaded prompt per approver with Approve/Reject buttons
//! - Decision and expiry records that replace a prompt's buttons

use approval_gate_core::{ApprovalTokens, ApproverSlot, Intent, SlotRegistry};

use super::types::{ActionElement, Block, ButtonStyle, ContextElement, PlainText};
use crate::config::RunContext;

/// Plain text fallback for notifications and clients without Block Kit.
pub const FALLBACK_TEXT: &str = "GitHub Actions Approval request";

/// Text shown in place of the buttons of an expired prompt.
pub const EXPIRED_TEXT: &str = "This approval request expired before a decision was made.";

/// Build the top-level summary message.
///
/// The message includes:
/// - The request reason
/// - Triggering actor and every approver
/// - Branch/environment, workflow run link and contextual URL
#[must_use]
pub fn build_request_summary(context: &RunContext, slots: &SlotRegistry) -> Vec<Block> {
    let approvers = slots.approvers().collect::<Vec<_>>().join(" ");

    vec![
        Block::section(format!(
            "GHA Approval Request for `{}` (Approval buttons are in thread)",
            context.reason
        )),
        Block::fields([
            format!("*Triggering Actor:* {}", context.actor),
            format!("*Approving Actor(s):* {approvers}"),
            format!("*Branch:* {}", context.environment),
            format!("*Workflow:* <{}|{}>", context.run_url, context.workflow),
            format!("*URL:* {}", context.url),
        ]),
    ]
}

/// Build the threaded prompt for one approver slot.
///
/// The actions block is always the last block; [`replace_prompt`] relies on
/// that.
#[must_use]
pub fn build_approver_prompt(slot: &ApproverSlot, tokens: &ApprovalTokens) -> Vec<Block> {
    vec![
        Block::fields([format!("*Approver:* {}", slot.approver())]),
        Block::Actions {
            elements: vec![
                ActionElement::Button {
                    text: PlainText::new("Approve"),
                    action_id: slot.action_id(Intent::Approve),
                    value: Some(tokens.approve().to_string()),
                    style: Some(ButtonStyle::Primary),
                },
                ActionElement::Button {
                    text: PlainText::new("Reject"),
                    action_id: slot.action_id(Intent::Reject),
                    value: Some(tokens.reject().to_string()),
                    style: Some(ButtonStyle::Danger),
                },
            ],
        },
    ]
}

/// Build the record that replaces a prompt's buttons once decided.
#[must_use]
pub fn build_decision_record(intent: Intent, user_id: &str) -> Block {
    Block::section(format!("{} by <@{user_id}>", intent.past_tense()))
}

/// Build the record that replaces a prompt's buttons when the run expires.
#[must_use]
pub fn build_expired_record() -> Block {
    Block::Context {
        elements: vec![ContextElement::Mrkdwn {
            text: EXPIRED_TEXT.to_string(),
        }],
    }
}

/// Swap the last block of a prompt (its buttons) for `record`.
pub fn replace_prompt(blocks: &mut Vec<Block>, record: Block) {
    blocks.pop();
    blocks.push(record);
}
