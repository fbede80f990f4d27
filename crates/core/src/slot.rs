//! Approver slots and action identifier routing.
//!
//! Each configured approver gets one slot, in configuration order. A slot owns
//! two action identifiers (`slack-approval-approve-<i>` and
//! `slack-approval-reject-<i>`), so a click can be attributed to the right
//! slot even though all sub-messages share one thread.

use crate::token::Intent;

/// Action identifier prefix for approve buttons.
pub const APPROVE_ACTION_PREFIX: &str = "slack-approval-approve-";

/// Action identifier prefix for reject buttons.
pub const REJECT_ACTION_PREFIX: &str = "slack-approval-reject-";

/// Build the action identifier for a slot and intent.
#[must_use]
pub fn action_id(intent: Intent, index: usize) -> String {
    match intent {
        Intent::Approve => format!("{APPROVE_ACTION_PREFIX}{index}"),
        Intent::Reject => format!("{REJECT_ACTION_PREFIX}{index}"),
    }
}

/// Parse an action identifier back into its slot index and intent.
///
/// Only the canonical form produced by [`action_id`] is accepted, so
/// `slack-approval-approve-01` does not alias slot 1.
#[must_use]
pub fn parse_action_id(id: &str) -> Option<(usize, Intent)> {
    let (intent, digits) = if let Some(rest) = id.strip_prefix(APPROVE_ACTION_PREFIX) {
        (Intent::Approve, rest)
    } else if let Some(rest) = id.strip_prefix(REJECT_ACTION_PREFIX) {
        (Intent::Reject, rest)
    } else {
        return None;
    };

    let index: usize = digits.parse().ok()?;
    (index.to_string() == digits).then_some((index, intent))
}

/// Tracking record for one approver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproverSlot {
    index: usize,
    approver: String,
    decided: bool,
}

impl ApproverSlot {
    fn new(index: usize, approver: String) -> Self {
        Self {
            index,
            approver,
            decided: false,
        }
    }

    /// 0-based position, fixed for the run.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Display name of the approver this slot is waiting on.
    #[must_use]
    pub fn approver(&self) -> &str {
        &self.approver
    }

    /// Whether a response for this slot has already been accepted.
    #[must_use]
    pub const fn is_decided(&self) -> bool {
        self.decided
    }

    /// Action identifier of this slot's button for `intent`.
    #[must_use]
    pub fn action_id(&self, intent: Intent) -> String {
        action_id(intent, self.index)
    }

    /// Mark the slot decided. Returns `false` if it already was.
    pub(crate) const fn mark_decided(&mut self) -> bool {
        if self.decided {
            return false;
        }
        self.decided = true;
        true
    }
}

/// Ordered set of approver slots for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotRegistry {
    slots: Vec<ApproverSlot>,
}

impl SlotRegistry {
    /// Create one slot per name. Duplicate names become independent slots.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| ApproverSlot::new(index, name.into()))
            .collect();
        Self { slots }
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there are no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ApproverSlot> {
        self.slots.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut ApproverSlot> {
        self.slots.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApproverSlot> {
        self.slots.iter()
    }

    /// Approver names in slot order.
    pub fn approvers(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(ApproverSlot::approver)
    }

    /// Resolve an inbound action identifier to a slot index and intent.
    ///
    /// Returns `None` for identifiers that are malformed or name a slot this
    /// run does not have.
    #[must_use]
    pub fn resolve(&self, action_id: &str) -> Option<(usize, Intent)> {
        parse_action_id(action_id).filter(|(index, _)| *index < self.slots.len())
    }
}
