//! Integration tests for the approval request's Slack messages.
//!
//! These tests verify that Block Kit messages are built correctly for the
//! summary, the per-approver prompts, and the records that replace them.

use approval_gate::slack::{
    ActionElement, Block, EXPIRED_TEXT, FALLBACK_TEXT, Text, build_approver_prompt,
    build_decision_record, build_expired_record, build_request_summary, replace_prompt,
};
use approval_gate_core::{ApprovalRun, Intent};
use approval_gate_integration_tests::run_context;

fn to_json(blocks: &[Block]) -> String {
    serde_json::to_string(blocks).expect("blocks serialize")
}

// =============================================================================
// Summary Tests
// =============================================================================

#[test]
fn test_summary_mentions_reason_and_thread() {
    let run = ApprovalRun::new(["alice", "bob"]).expect("run");
    let json = to_json(&build_request_summary(&run_context(), run.slots()));

    assert!(json.contains("GHA Approval Request for `release v1.2.3`"));
    assert!(json.contains("Approval buttons are in thread"));
}

#[test]
fn test_summary_fields() {
    let run = ApprovalRun::new(["alice", "bob", "carol"]).expect("run");
    let blocks = build_request_summary(&run_context(), run.slots());

    let Some(Block::Section {
        fields: Some(fields),
        ..
    }) = blocks.get(1)
    else {
        panic!("Expected a fields section after the header text");
    };
    let fields: Vec<&str> = fields
        .iter()
        .map(|f| match f {
            Text::Mrkdwn { text } => text.as_str(),
        })
        .collect();
    assert_eq!(
        fields,
        vec![
            "*Triggering Actor:* octocat",
            "*Approving Actor(s):* alice bob carol",
            "*Branch:* production",
            "*Workflow:* <https://github.com/acme/app/actions/runs/42|Deploy>",
            "*URL:* https://app.example.com",
        ]
    );
}

#[test]
fn test_summary_has_no_buttons() {
    let run = ApprovalRun::new(["alice"]).expect("run");
    let blocks = build_request_summary(&run_context(), run.slots());
    assert!(!blocks.iter().any(|b| matches!(b, Block::Actions { .. })));
}

#[test]
fn test_fallback_text() {
    assert_eq!(FALLBACK_TEXT, "GitHub Actions Approval request");
}

// =============================================================================
// Prompt Tests
// =============================================================================

#[test]
fn test_prompt_per_slot_names_approver() {
    let run = ApprovalRun::new(["alice", "bob"]).expect("run");

    for slot in run.slots().iter() {
        let blocks = build_approver_prompt(slot, run.tokens());
        let json = to_json(&blocks);
        assert!(json.contains(&format!("*Approver:* {}", slot.approver())));
        assert!(json.contains(&format!("slack-approval-approve-{}", slot.index())));
        assert!(json.contains(&format!("slack-approval-reject-{}", slot.index())));
    }
}

#[test]
fn test_prompt_buttons_are_styled() {
    let run = ApprovalRun::new(["alice"]).expect("run");
    let slot = run.slots().get(0).expect("slot");
    let json = serde_json::to_value(build_approver_prompt(slot, run.tokens())).expect("json");

    let elements = &json[1]["elements"];
    assert_eq!(elements[0]["text"]["text"], "Approve");
    assert_eq!(elements[0]["style"], "primary");
    assert_eq!(elements[1]["text"]["text"], "Reject");
    assert_eq!(elements[1]["style"], "danger");
}

#[test]
fn test_prompts_share_run_tokens() {
    let run = ApprovalRun::new(["alice", "bob"]).expect("run");

    let values: Vec<String> = run
        .slots()
        .iter()
        .flat_map(|slot| build_approver_prompt(slot, run.tokens()))
        .filter_map(|block| match block {
            Block::Actions { elements } => Some(elements),
            _ => None,
        })
        .flatten()
        .filter_map(|element| {
            let ActionElement::Button { value, .. } = element;
            value
        })
        .collect();

    assert_eq!(
        values,
        vec![
            run.tokens().approve(),
            run.tokens().reject(),
            run.tokens().approve(),
            run.tokens().reject(),
        ]
    );
}

// =============================================================================
// Record Tests
// =============================================================================

#[test]
fn test_decision_records() {
    assert_eq!(
        build_decision_record(Intent::Approve, "U123"),
        Block::section("Approved by <@U123>")
    );
    assert_eq!(
        build_decision_record(Intent::Reject, "U456"),
        Block::section("Rejected by <@U456>")
    );
}

#[test]
fn test_replace_prompt_keeps_approver_line() {
    let run = ApprovalRun::new(["alice"]).expect("run");
    let slot = run.slots().get(0).expect("slot");
    let mut blocks = build_approver_prompt(slot, run.tokens());

    replace_prompt(&mut blocks, build_decision_record(Intent::Approve, "U1"));

    assert_eq!(blocks.len(), 2);
    let json = to_json(&blocks);
    assert!(json.contains("*Approver:* alice"));
    assert!(json.contains("Approved by <@U1>"));
    assert!(!json.contains(run.tokens().approve()));
}

#[test]
fn test_expired_record() {
    let json = to_json(&[build_expired_record()]);
    assert!(json.contains(EXPIRED_TEXT));
    assert!(json.contains("\"type\":\"context\""));
}
