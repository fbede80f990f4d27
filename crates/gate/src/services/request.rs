//! Posting the approval request.
//!
//! The summary goes to the channel first, then one prompt per approver slot
//! is posted in its thread, in slot order. Every prompt's handle and block
//! list is recorded before any click is processed, so the coordinator can
//! edit a prompt without re-deriving its content.

use approval_gate_core::ApprovalRun;
use tracing::{debug, info, instrument};

use crate::config::RunContext;
use crate::notifier::{MessageHandle, Notifier};
use crate::slack::{FALLBACK_TEXT, SlackError, build_approver_prompt, build_request_summary};

/// A posted message and the blocks it currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub handle: MessageHandle,
    pub blocks: Vec<crate::slack::Block>,
}

/// Everything posted for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedRequest {
    /// Top-level summary message.
    pub summary: MessageHandle,
    /// One prompt per slot, indexed like the run's slots.
    pub prompts: Vec<PostedMessage>,
}

impl PostedRequest {
    /// The prompt for a slot.
    #[must_use]
    pub fn prompt(&self, slot: usize) -> Option<&PostedMessage> {
        self.prompts.get(slot)
    }
}

/// Post the summary and every approver prompt.
///
/// # Errors
///
/// Returns error if any post fails; the run cannot continue without all of
/// its prompts.
#[instrument(skip_all, fields(channel = %channel, approvers = run.slots().len()))]
pub async fn post_request<N: Notifier>(
    notifier: &N,
    channel: &str,
    context: &RunContext,
    run: &ApprovalRun,
) -> Result<PostedRequest, SlackError> {
    let summary_blocks = build_request_summary(context, run.slots());
    let summary = notifier
        .post(channel, summary_blocks, FALLBACK_TEXT)
        .await?;
    debug!(ts = %summary.ts, "Posted request summary");

    let mut prompts = Vec::with_capacity(run.slots().len());
    for slot in run.slots().iter() {
        let blocks = build_approver_prompt(slot, run.tokens());
        let handle = notifier
            .post_threaded(&summary, blocks.clone(), FALLBACK_TEXT)
            .await?;
        debug!(slot = slot.index(), approver = %slot.approver(), ts = %handle.ts, "Posted approver prompt");
        prompts.push(PostedMessage { handle, blocks });
    }

    info!(
        approvers = prompts.len(),
        "Approval request posted"
    );

    Ok(PostedRequest { summary, prompts })
}
