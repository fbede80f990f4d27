//! Slack webhook handler for interaction responses.
//!
//! Handles Approve/Reject clicks on the threaded approver prompts.

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use tracing::{debug, instrument};

use super::InteractionState;
use crate::error::GateError;
use crate::slack::InteractionPayload;

/// Create Slack webhook routes.
pub fn router() -> Router<InteractionState> {
    Router::new().route("/slack/interactions", post(handle_interaction))
}

/// Handle Slack interaction webhook.
///
/// Verifies the request signature, then forwards every button press to the
/// coordinator. Validation against the run happens there, so this always
/// answers 200 once the payload is authentic and well-formed.
#[instrument(skip(state, headers, body))]
async fn handle_interaction(
    State(state): State<InteractionState>,
    headers: HeaderMap,
    body: String,
) -> Result<impl IntoResponse, GateError> {
    // Extract headers for signature verification
    let timestamp = headers
        .get("X-Slack-Request-Timestamp")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GateError::BadRequest("Missing timestamp header".into()))?;

    let signature = headers
        .get("X-Slack-Signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GateError::BadRequest("Missing signature header".into()))?;

    state
        .slack()
        .verify_signature(timestamp, &body, signature)
        .map_err(|e| GateError::Unauthorized(e.to_string()))?;

    let payload = decode_payload(&body)?;
    let events = payload.action_events();
    debug!(
        interaction_type = %payload.interaction_type,
        actions = events.len(),
        "Received interaction"
    );

    for event in events {
        if state.events().send(event).await.is_err() {
            // The run already finished; Slack still needs its 200.
            debug!("Coordinator gone, dropping interaction");
            break;
        }
    }

    Ok(StatusCode::OK)
}

/// Decode the `payload=` form field into an interaction payload.
fn decode_payload(body: &str) -> Result<InteractionPayload, GateError> {
    let payload_str = body
        .strip_prefix("payload=")
        .ok_or_else(|| GateError::BadRequest("Invalid payload format".into()))?;

    // Form encoding uses '+' for spaces; a literal '+' arrives as %2B.
    let payload_str = payload_str.replace('+', " ");
    let payload_decoded = urlencoding::decode(&payload_str)
        .map_err(|e| GateError::BadRequest(format!("Failed to decode payload: {e}")))?;

    serde_json::from_str(&payload_decoded)
        .map_err(|e| GateError::BadRequest(format!("Failed to parse payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_payload() {
        let json = r#"{"type":"block_actions","user":{"id":"U1"},"actions":[{"action_id":"slack-approval-approve-0","value":"t-approve"}]}"#;
        let body = format!("payload={}", urlencoding::encode(json));

        let payload = decode_payload(&body).expect("decoded");
        let events = payload.action_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action_id, "slack-approval-approve-0");
        assert_eq!(events[0].user_id, "U1");
    }

    #[test]
    fn test_decode_payload_form_spaces() {
        let body = "payload=%7B%22type%22%3A%22block_actions%22%2C%22user%22%3A%7B%22id%22%3A%22U1%22%2C%22name%22%3A%22Jane+Doe%22%7D%7D";
        let payload = decode_payload(body).expect("decoded");
        assert_eq!(payload.user.name.as_deref(), Some("Jane Doe"));
        assert!(payload.action_events().is_empty());
    }

    #[test]
    fn test_decode_payload_rejects_other_forms() {
        assert!(matches!(
            decode_payload("foo=bar"),
            Err(GateError::BadRequest(_))
        ));
        assert!(matches!(
            decode_payload("payload=not-json"),
            Err(GateError::BadRequest(_))
        ));
    }
}
