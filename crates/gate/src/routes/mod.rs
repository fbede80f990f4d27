//! HTTP routes for the interactions transport.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! POST /slack/interactions     - Signed Slack button presses
//! ```

pub mod slack;

use std::net::SocketAddr;
use std::time::Duration;

use approval_gate_core::ActionEvent;
use axum::{Router, routing::get};
use tokio::sync::mpsc;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::error::GateError;
use crate::slack::SlackClient;

/// Shared state for the interaction handlers.
#[derive(Clone, Debug)]
pub struct InteractionState {
    slack: SlackClient,
    events: mpsc::Sender<ActionEvent>,
}

impl InteractionState {
    /// Create state that verifies with `slack` and forwards to `events`.
    #[must_use]
    pub const fn new(slack: SlackClient, events: mpsc::Sender<ActionEvent>) -> Self {
        Self { slack, events }
    }

    /// Client holding the signing secret.
    #[must_use]
    pub const fn slack(&self) -> &SlackClient {
        &self.slack
    }

    /// Channel into the coordinator.
    #[must_use]
    pub const fn events(&self) -> &mpsc::Sender<ActionEvent> {
        &self.events
    }
}

/// Build the application router.
pub fn router(state: InteractionState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(slack::router())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Serve the interactions endpoint until the task is dropped.
///
/// # Errors
///
/// Returns error if the address cannot be bound or the server fails.
pub async fn serve(addr: SocketAddr, state: InteractionState) -> Result<(), GateError> {
    let app = router(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| GateError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("Listening for Slack interactions on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| GateError::Internal(format!("server error: {e}")))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
