//! The coordinator: the single owner of a run's state.
//!
//! Every inbound click, from either transport, is funneled through one
//! `mpsc` channel and applied with [`Coordinator::apply`]. The coordinator
//! owns the [`ApprovalRun`] outright, so dispatch, quorum accounting and the
//! terminal check happen one event at a time with no shared locks.
//!
//! For each accepted decision the slot's prompt is edited (buttons replaced
//! by "Approved by"/"Rejected by"), and a terminal verdict ends the loop.

use approval_gate_core::{
    ActionEvent, ApprovalRun, ApproverSlot, Decision, Dispatch, IgnoreReason, Verdict,
};
use tracing::{debug, info, instrument, warn};

use super::request::PostedRequest;
use crate::lifecycle::GateOutcome;
use crate::notifier::Notifier;
use crate::slack::{SlackError, build_decision_record, build_expired_record, replace_prompt};

/// Drives one run from posted request to terminal outcome.
#[derive(Debug)]
pub struct Coordinator<N> {
    run: ApprovalRun,
    posted: PostedRequest,
    notifier: N,
}

impl<N: Notifier> Coordinator<N> {
    /// Create a coordinator for a run whose request is already posted.
    #[must_use]
    pub const fn new(run: ApprovalRun, posted: PostedRequest, notifier: N) -> Self {
        Self {
            run,
            posted,
            notifier,
        }
    }

    /// Current run state.
    #[must_use]
    pub const fn run_state(&self) -> &ApprovalRun {
        &self.run
    }

    /// Messages as last sent to Slack.
    #[must_use]
    pub const fn posted(&self) -> &PostedRequest {
        &self.posted
    }

    /// Apply one event, turning a failed prompt edit into
    /// [`GateOutcome::Failed`].
    ///
    /// Returns the terminal outcome if this event ended the run.
    pub async fn apply(&mut self, event: &ActionEvent) -> Option<GateOutcome> {
        match self.handle(event).await {
            Ok(outcome) => outcome,
            Err(e) => Some(GateOutcome::Failed(e.to_string())),
        }
    }

    /// Apply a single event.
    ///
    /// Returns the terminal outcome if this event completed the run.
    ///
    /// # Errors
    ///
    /// Returns error if the decided slot's prompt could not be updated.
    #[instrument(skip_all, fields(action_id = %event.action_id, user = %event.user_id))]
    pub async fn handle(&mut self, event: &ActionEvent) -> Result<Option<GateOutcome>, SlackError> {
        let decision = match self.run.dispatch(event) {
            Dispatch::Decided(decision) => decision,
            Dispatch::Ignored(reason) => {
                log_ignored(reason);
                return Ok(None);
            }
        };

        match decision.verdict {
            Verdict::SlotApproved { remaining, .. } => {
                info!(
                    approver = %decision.approver,
                    user = %decision.user_id,
                    "Received approval"
                );
                info!(remaining, "{remaining} approvals still needed");
            }
            Verdict::RunSucceeded => {
                info!(
                    approver = %decision.approver,
                    user = %decision.user_id,
                    "Received approval"
                );
            }
            Verdict::RunFailed => {
                info!(
                    approver = %decision.approver,
                    user = %decision.user_id,
                    "Rejection received"
                );
            }
        }

        self.record_decision(&decision).await?;

        Ok(match decision.verdict {
            Verdict::SlotApproved { .. } => None,
            Verdict::RunSucceeded => Some(GateOutcome::Approved),
            Verdict::RunFailed => Some(GateOutcome::Rejected {
                approver: decision.approver,
                user_id: decision.user_id,
            }),
        })
    }

    /// Mark every undecided prompt as expired.
    ///
    /// Edits are best-effort; the run is over either way.
    pub async fn expire(&mut self) -> GateOutcome {
        let pending: Vec<usize> = self
            .run
            .slots()
            .iter()
            .filter(|slot| !slot.is_decided())
            .map(ApproverSlot::index)
            .collect();

        for index in pending {
            let Some(prompt) = self.posted.prompts.get_mut(index) else {
                continue;
            };
            replace_prompt(&mut prompt.blocks, build_expired_record());
            if let Err(e) = self
                .notifier
                .update(&prompt.handle, prompt.blocks.clone())
                .await
            {
                warn!(slot = index, error = %e, "Failed to mark prompt expired");
            }
        }

        GateOutcome::Expired
    }

    /// Replace the decided slot's buttons with the decision record.
    async fn record_decision(&mut self, decision: &Decision) -> Result<(), SlackError> {
        let prompt = self.posted.prompts.get_mut(decision.slot).ok_or_else(|| {
            SlackError::Config(format!("no posted prompt for slot {}", decision.slot))
        })?;

        replace_prompt(
            &mut prompt.blocks,
            build_decision_record(decision.intent, &decision.user_id),
        );
        self.notifier
            .update(&prompt.handle, prompt.blocks.clone())
            .await?;

        debug!(
            slot = decision.slot,
            intent = %decision.intent,
            "Prompt updated"
        );
        Ok(())
    }
}

fn log_ignored(reason: IgnoreReason) {
    match reason {
        IgnoreReason::UnknownAction => debug!("Ignoring unknown action"),
        IgnoreReason::TokenMismatch => warn!("Ignoring action with a token from another run"),
        IgnoreReason::AlreadyDecided => debug!("Ignoring repeated action for a decided slot"),
        IgnoreReason::RunFinished => debug!("Ignoring action after the run finished"),
    }
}
