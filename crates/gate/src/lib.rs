//! Approval gate library.
//!
//! Posts a quorum approval request to Slack and blocks until every listed
//! approver approves, anyone rejects, the optional timeout elapses, or the
//! process is told to stop. The binary maps the result to its exit code so a
//! CI job can gate on it.
//!
//! # Security
//!
//! Holds a Slack bot token and, depending on the transport, an app-level
//! token or signing secret. Every click is checked against the per-run
//! tokens before it counts.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod host;
pub mod lifecycle;
pub mod notifier;
pub mod routes;
pub mod runner;
pub mod services;
pub mod slack;
