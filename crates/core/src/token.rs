//! Per-run correlation tokens.
//!
//! Every button posted for a run carries one of two tokens as its value.
//! A click is accepted only when its value equals the token for the intent
//! its action identifier claims, so presses on messages left over from an
//! earlier run (or hand-crafted payloads) never count.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a button press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Approve,
    Reject,
}

impl Intent {
    /// Lowercase name, used in action identifiers and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }

    /// Past-tense label used in decision records ("Approved by ...").
    #[must_use]
    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Approve => "Approved",
            Self::Reject => "Rejected",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The approve/reject token pair shared by all slots of one run.
///
/// Implements `Debug` manually so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApprovalTokens {
    approve: String,
    reject: String,
}

impl std::fmt::Debug for ApprovalTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalTokens")
            .field("approve", &"[REDACTED]")
            .field("reject", &"[REDACTED]")
            .finish()
    }
}

impl ApprovalTokens {
    /// Generate a fresh token pair.
    ///
    /// Both halves come from independent v4 UUIDs (OS CSPRNG) and carry a
    /// distinct suffix, so they can never be equal to each other.
    #[must_use]
    pub fn generate() -> Self {
        Self {
            approve: format!("{}-approve", Uuid::new_v4()),
            reject: format!("{}-reject", Uuid::new_v4()),
        }
    }

    /// Token embedded in every "Approve" button.
    #[must_use]
    pub fn approve(&self) -> &str {
        &self.approve
    }

    /// Token embedded in every "Reject" button.
    #[must_use]
    pub fn reject(&self) -> &str {
        &self.reject
    }

    /// Token expected for the given intent.
    #[must_use]
    pub fn for_intent(&self, intent: Intent) -> &str {
        match intent {
            Intent::Approve => &self.approve,
            Intent::Reject => &self.reject,
        }
    }

    /// Whether `value` is this run's token for `intent`.
    #[must_use]
    pub fn matches(&self, intent: Intent, value: &str) -> bool {
        constant_time_eq(self.for_intent(intent), value)
    }
}

/// Constant-time string comparison to prevent timing attacks.
#[must_use]
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }

    result == 0
}
