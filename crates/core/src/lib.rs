//! Approval Gate Core - quorum approval state machine.
//!
//! This crate holds everything about a gate run that does not talk to the
//! outside world:
//! - [`token`] - per-run approve/reject tokens that bind clicks to this run
//! - [`slot`] - approver slots and action identifier routing
//! - [`quorum`] - unanimity/veto evaluation
//! - [`run`] - the [`ApprovalRun`] aggregate and its event dispatch
//!
//! # Architecture
//!
//! The core crate contains only types and logic - no I/O, no async, no HTTP
//! clients. The `approval-gate` crate owns a single [`ApprovalRun`] inside one
//! coordinating task and feeds it events from Slack.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod quorum;
pub mod run;
pub mod slot;
pub mod token;

pub use quorum::{Outcome, QuorumEvaluator, Verdict};
pub use run::{ActionEvent, ApprovalRun, Decision, Dispatch, IgnoreReason, RunError};
pub use slot::{ApproverSlot, SlotRegistry, action_id, parse_action_id};
pub use token::{ApprovalTokens, Intent, constant_time_eq};
