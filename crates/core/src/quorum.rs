//! Quorum evaluation: unanimity to proceed, any single rejection vetoes.
//!
//! ```text
//! Pending --(approvals == required)--> Approved
//! Pending --(any reject)-------------> Rejected
//! ```
//!
//! Both terminal states are final. Input recorded after a terminal state is
//! dropped.

use serde::{Deserialize, Serialize};

use crate::token::Intent;

/// Aggregate outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[default]
    Pending,
    /// Every slot approved.
    Approved,
    /// At least one slot rejected.
    Rejected,
}

impl Outcome {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Approved | Self::Rejected)
    }
}

/// Result of recording one slot decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A slot approved but quorum is not reached yet.
    SlotApproved { approved: usize, remaining: usize },
    /// The last outstanding slot approved.
    RunSucceeded,
    /// A slot rejected; the run is vetoed.
    RunFailed,
}

impl Verdict {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::RunSucceeded | Self::RunFailed)
    }
}

/// Counts approvals against the number of required slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumEvaluator {
    required: usize,
    approved: usize,
    outcome: Outcome,
}

impl QuorumEvaluator {
    #[must_use]
    pub const fn new(required: usize) -> Self {
        Self {
            required,
            approved: 0,
            outcome: Outcome::Pending,
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[must_use]
    pub const fn approved_count(&self) -> usize {
        self.approved
    }

    #[must_use]
    pub const fn required(&self) -> usize {
        self.required
    }

    /// Approvals still needed for quorum.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.required.saturating_sub(self.approved)
    }

    /// Record one slot decision.
    ///
    /// Returns `None` once the outcome is terminal; nothing is mutated in
    /// that case.
    pub const fn record(&mut self, intent: Intent) -> Option<Verdict> {
        if self.outcome.is_terminal() {
            return None;
        }

        match intent {
            Intent::Approve => {
                self.approved += 1;
                if self.approved >= self.required {
                    self.outcome = Outcome::Approved;
                    Some(Verdict::RunSucceeded)
                } else {
                    Some(Verdict::SlotApproved {
                        approved: self.approved,
                        remaining: self.remaining(),
                    })
                }
            }
            Intent::Reject => {
                self.outcome = Outcome::Rejected;
                Some(Verdict::RunFailed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unanimity_required() {
        let mut quorum = QuorumEvaluator::new(3);
        assert_eq!(
            quorum.record(Intent::Approve),
            Some(Verdict::SlotApproved {
                approved: 1,
                remaining: 2
            })
        );
        assert_eq!(
            quorum.record(Intent::Approve),
            Some(Verdict::SlotApproved {
                approved: 2,
                remaining: 1
            })
        );
        assert_eq!(quorum.outcome(), Outcome::Pending);
        assert_eq!(quorum.record(Intent::Approve), Some(Verdict::RunSucceeded));
        assert_eq!(quorum.outcome(), Outcome::Approved);
        assert_eq!(quorum.remaining(), 0);
    }

    #[test]
    fn test_single_reject_vetoes_after_approvals() {
        let mut quorum = QuorumEvaluator::new(3);
        quorum.record(Intent::Approve);
        quorum.record(Intent::Approve);
        assert_eq!(quorum.record(Intent::Reject), Some(Verdict::RunFailed));
        assert_eq!(quorum.outcome(), Outcome::Rejected);
    }

    #[test]
    fn test_terminal_state_drops_input() {
        let mut quorum = QuorumEvaluator::new(1);
        assert_eq!(quorum.record(Intent::Reject), Some(Verdict::RunFailed));
        assert_eq!(quorum.record(Intent::Approve), None);
        assert_eq!(quorum.approved_count(), 0);
        assert_eq!(quorum.outcome(), Outcome::Rejected);

        let mut quorum = QuorumEvaluator::new(1);
        assert_eq!(quorum.record(Intent::Approve), Some(Verdict::RunSucceeded));
        assert_eq!(quorum.record(Intent::Reject), None);
        assert_eq!(quorum.outcome(), Outcome::Approved);
    }

    #[test]
    fn test_verdict_terminality() {
        assert!(Verdict::RunSucceeded.is_terminal());
        assert!(Verdict::RunFailed.is_terminal());
        assert!(
            !Verdict::SlotApproved {
                approved: 1,
                remaining: 1
            }
            .is_terminal()
        );
        assert!(!Outcome::Pending.is_terminal());
        assert_eq!(Outcome::default(), Outcome::Pending);
    }
}
