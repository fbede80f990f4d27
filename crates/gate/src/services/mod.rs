//! Run orchestration services.
//!
//! # Services
//!
//! - `request` - Posts the summary and per-approver prompts
//! - `coordinator` - Owns the run and applies button presses in order

pub mod coordinator;
pub mod request;

pub use coordinator::Coordinator;
pub use request::{PostedMessage, PostedRequest, post_request};
