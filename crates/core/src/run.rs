//! The approval run: tokens, slots and quorum behind one owner.
//!
//! [`ApprovalRun::dispatch`] is the only entry point that mutates run state.
//! It takes `&mut self`, so whoever owns the run serializes inbound events
//! and each check-and-set below happens without a suspension point.

use thiserror::Error;

use crate::quorum::{Outcome, QuorumEvaluator, Verdict};
use crate::slot::SlotRegistry;
use crate::token::{ApprovalTokens, Intent};

/// Errors constructing a run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    /// A run needs at least one approver, otherwise it could never finish.
    #[error("at least one approver is required")]
    NoApprovers,
}

/// One inbound button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    /// `action_id` of the clicked button.
    pub action_id: String,
    /// `value` carried by the clicked button.
    pub value: String,
    /// Platform user id of whoever clicked.
    pub user_id: String,
}

impl ActionEvent {
    pub fn new(
        action_id: impl Into<String>,
        value: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            action_id: action_id.into(),
            value: value.into(),
            user_id: user_id.into(),
        }
    }
}

/// Why an event was dropped without touching state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The action identifier does not name a slot of this run.
    UnknownAction,
    /// The button value is not this run's token for the claimed intent.
    TokenMismatch,
    /// The slot already has a decision (double click, redelivery).
    AlreadyDecided,
    /// The run already reached a terminal outcome.
    RunFinished,
}

/// An accepted slot decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub slot: usize,
    pub approver: String,
    pub intent: Intent,
    pub user_id: String,
    pub verdict: Verdict,
}

/// What [`ApprovalRun::dispatch`] did with an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Ignored(IgnoreReason),
    Decided(Decision),
}

/// State of a single gate invocation.
#[derive(Debug, Clone)]
pub struct ApprovalRun {
    tokens: ApprovalTokens,
    slots: SlotRegistry,
    quorum: QuorumEvaluator,
}

impl ApprovalRun {
    /// Start a run with freshly generated tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoApprovers`] if `approvers` is empty.
    pub fn new<I, S>(approvers: I) -> Result<Self, RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_tokens(approvers, ApprovalTokens::generate())
    }

    /// Start a run with the given tokens.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::NoApprovers`] if `approvers` is empty.
    pub fn with_tokens<I, S>(approvers: I, tokens: ApprovalTokens) -> Result<Self, RunError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = SlotRegistry::from_names(approvers);
        if slots.is_empty() {
            return Err(RunError::NoApprovers);
        }
        let quorum = QuorumEvaluator::new(slots.len());
        Ok(Self {
            tokens,
            slots,
            quorum,
        })
    }

    #[must_use]
    pub const fn tokens(&self) -> &ApprovalTokens {
        &self.tokens
    }

    #[must_use]
    pub const fn slots(&self) -> &SlotRegistry {
        &self.slots
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.quorum.outcome()
    }

    #[must_use]
    pub const fn approved_count(&self) -> usize {
        self.quorum.approved_count()
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.quorum.remaining()
    }

    /// Validate an inbound event and apply it.
    ///
    /// 1. Resolve the action identifier to a slot and intent.
    /// 2. Check the value against this run's token for that intent.
    /// 3. Drop the event if the run is already terminal.
    /// 4. Drop the event if the slot already has a decision.
    /// 5. Mark the slot decided and record the intent with the quorum.
    pub fn dispatch(&mut self, event: &ActionEvent) -> Dispatch {
        let Some((index, intent)) = self.slots.resolve(&event.action_id) else {
            return Dispatch::Ignored(IgnoreReason::UnknownAction);
        };

        if !self.tokens.matches(intent, &event.value) {
            return Dispatch::Ignored(IgnoreReason::TokenMismatch);
        }

        if self.quorum.outcome().is_terminal() {
            return Dispatch::Ignored(IgnoreReason::RunFinished);
        }

        let Some(slot) = self.slots.get_mut(index) else {
            return Dispatch::Ignored(IgnoreReason::UnknownAction);
        };
        if !slot.mark_decided() {
            return Dispatch::Ignored(IgnoreReason::AlreadyDecided);
        }
        let approver = slot.approver().to_string();

        match self.quorum.record(intent) {
            Some(verdict) => Dispatch::Decided(Decision {
                slot: index,
                approver,
                intent,
                user_id: event.user_id.clone(),
                verdict,
            }),
            None => Dispatch::Ignored(IgnoreReason::RunFinished),
        }
    }
}
