//! Terminal outcomes and how they end the process.
//!
//! Nothing below `main` exits the process. Every path produces exactly one
//! [`GateOutcome`], and [`finish`] turns it into the exit code.

use std::process::ExitCode;

use tracing::{error, info, warn};

use crate::host;

/// How a gate run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// Every approver approved.
    Approved,
    /// An approver vetoed the run.
    Rejected {
        /// Slot display name.
        approver: String,
        /// Platform user id of whoever clicked.
        user_id: String,
    },
    /// The optional timeout elapsed first.
    Expired,
    /// The process was asked to stop (Ctrl+C / SIGTERM).
    Cancelled,
    /// An unrecoverable error.
    Failed(String),
}

impl GateOutcome {
    /// Whether downstream steps may proceed.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Process exit status: 0 = proceed, 1 = abort.
    #[must_use]
    pub const fn exit_status(&self) -> u8 {
        if self.is_approved() { 0 } else { 1 }
    }

    /// Message to surface through the host's failure channel.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Approved => None,
            Self::Rejected { approver, user_id } => Some(format!(
                "Approval request rejected for {approver} by {user_id}"
            )),
            Self::Expired => Some("approval request expired".to_string()),
            Self::Cancelled => Some("approval gate cancelled".to_string()),
            Self::Failed(reason) => Some(reason.clone()),
        }
    }
}

impl From<&GateOutcome> for ExitCode {
    fn from(outcome: &GateOutcome) -> Self {
        Self::from(outcome.exit_status())
    }
}

/// Log the outcome, report failures to the host, and produce the exit code.
#[must_use]
pub fn finish(outcome: &GateOutcome) -> ExitCode {
    match outcome {
        GateOutcome::Approved => info!("All approvals received, proceeding"),
        GateOutcome::Rejected { approver, user_id } => {
            warn!(approver = %approver, user = %user_id, "Approval request rejected");
        }
        GateOutcome::Expired => warn!("Approval request expired"),
        GateOutcome::Cancelled => warn!("Approval gate cancelled"),
        GateOutcome::Failed(reason) => error!(error = %reason, "Approval gate failed"),
    }

    if let Some(message) = outcome.failure_message() {
        host::report_failure(&message);
    }

    ExitCode::from(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_approved_exits_zero() {
        assert_eq!(GateOutcome::Approved.exit_status(), 0);
        assert_eq!(
            GateOutcome::Rejected {
                approver: "bob".into(),
                user_id: "U2".into()
            }
            .exit_status(),
            1
        );
        assert_eq!(GateOutcome::Expired.exit_status(), 1);
        assert_eq!(GateOutcome::Cancelled.exit_status(), 1);
        assert_eq!(GateOutcome::Failed("boom".into()).exit_status(), 1);
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(GateOutcome::Approved.failure_message(), None);
        assert_eq!(
            GateOutcome::Rejected {
                approver: "bob".into(),
                user_id: "U2".into()
            }
            .failure_message()
            .as_deref(),
            Some("Approval request rejected for bob by U2")
        );
        assert_eq!(
            GateOutcome::Failed("Slack error: boom".into())
                .failure_message()
                .as_deref(),
            Some("Slack error: boom")
        );
    }
}
