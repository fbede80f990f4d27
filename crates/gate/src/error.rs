//! Unified error handling for the gate.

use approval_gate_core::RunError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::ConfigError;
use crate::slack::SlackError;

/// Application-level error type for the gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Slack API or transport operation failed.
    #[error("Slack error: {0}")]
    Slack(#[from] SlackError),

    /// The run could not be constructed.
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// Request is not signed by Slack.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(
            self,
            Self::Config(_) | Self::Run(_) | Self::Slack(_) | Self::Internal(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Interaction request error"
            );
        }

        let status = match &self {
            Self::Config(_) | Self::Run(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Slack(_) => StatusCode::BAD_GATEWAY,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Config(_) | Self::Run(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Slack(_) => "External service error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}
