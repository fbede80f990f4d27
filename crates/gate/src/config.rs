//! Gate configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SLACK_BOT_TOKEN` - Slack bot token (xoxb-...)
//! - `SLACK_CHANNEL_ID` - Channel the approval request is posted to
//! - `APPROVERS` - Approver names separated by `::` (or a single `APPROVER`)
//!
//! ## Transport (one of)
//! - `SLACK_APP_TOKEN` - App-level token (xapp-...); enables Socket Mode
//! - `SLACK_SIGNING_SECRET` - Signing secret for the HTTP interactions endpoint
//!
//! ## Optional (request context)
//! - `REQUEST_REASON` - Free-text reason shown in the request
//! - `ENVIRONMENT` - Branch or environment name
//! - `URL` - Contextual URL
//! - `GITHUB_ACTOR`, `GITHUB_WORKFLOW` - Triggering actor and workflow name
//! - `GITHUB_SERVER_URL`, `GITHUB_REPOSITORY`, `GITHUB_RUN_ID` - Run link
//!
//! ## Optional (runtime)
//! - `GATE_HOST` - Bind address for the interactions endpoint (default: 127.0.0.1)
//! - `PORT` - Listen port for the interactions endpoint (default: 3000)
//! - `APPROVAL_TIMEOUT_SECS` - Expire the request after this many seconds (default: never)
//! - `LOG_FORMAT` - `json` for structured logs (default: text)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Separator between approver names in `APPROVERS`.
pub const APPROVER_SEPARATOR: &str = "::";

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("No approvers configured: set APPROVERS (separated by '::') or APPROVER")]
    NoApprovers,
    #[error("No Slack transport configured: set SLACK_APP_TOKEN or SLACK_SIGNING_SECRET")]
    NoTransport,
}

/// Gate configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Slack credentials and channel.
    pub slack: SlackConfig,
    /// Approver display names in slot order.
    pub approvers: Vec<String>,
    /// Read-only context describing the run being gated.
    pub context: RunContext,
    /// IP address to bind the interactions endpoint to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Expire the request after this long (`None` waits forever).
    pub timeout: Option<Duration>,
    /// Log output format.
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "ci", "staging")
    pub sentry_environment: Option<String>,
}

/// Slack configuration.
///
/// Implements `Debug` manually to redact secrets.
#[derive(Clone)]
pub struct SlackConfig {
    /// Slack bot token (xoxb-...).
    pub bot_token: SecretString,
    /// Channel ID for the approval request.
    pub channel_id: String,
    /// App-level token for Socket Mode (xapp-...).
    pub app_token: Option<SecretString>,
    /// Slack app signing secret for webhook verification.
    pub signing_secret: Option<SecretString>,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("channel_id", &self.channel_id)
            .field("app_token", &self.app_token.as_ref().map(|_| "[REDACTED]"))
            .field(
                "signing_secret",
                &self.signing_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// How button presses reach the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Outbound WebSocket opened with the app-level token.
    SocketMode,
    /// Signed HTTP requests to `/slack/interactions`.
    Interactions,
}

impl SlackConfig {
    /// Socket Mode wins when an app token is present.
    #[must_use]
    pub const fn transport(&self) -> Transport {
        if self.app_token.is_some() {
            Transport::SocketMode
        } else {
            Transport::Interactions
        }
    }
}

/// Context about the gated CI run, shown in the request summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Who triggered the run.
    pub actor: String,
    /// Workflow display name.
    pub workflow: String,
    /// Link to the workflow run.
    pub run_url: String,
    /// Branch or environment name.
    pub environment: String,
    /// Contextual URL.
    pub url: String,
    /// Free-text reason for the request.
    pub reason: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl GateConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid.
    pub fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let slack = SlackConfig::from_source(env)?;

        let raw_approvers = get_optional(env, "APPROVERS")
            .or_else(|| get_optional(env, "APPROVER"))
            .unwrap_or_default();
        let approvers = parse_approvers(&raw_approvers);
        if approvers.is_empty() {
            return Err(ConfigError::NoApprovers);
        }

        let host = match get_optional(env, "GATE_HOST") {
            Some(host) => host
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("GATE_HOST".into(), format!("{e}")))?,
            None => DEFAULT_HOST,
        };

        let port = match get_optional(env, "PORT") {
            Some(port) => port
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar("PORT".into(), format!("{e}")))?,
            None => DEFAULT_PORT,
        };

        let timeout = match get_optional(env, "APPROVAL_TIMEOUT_SECS") {
            Some(secs) => {
                let secs: u64 = secs.parse().map_err(|e| {
                    ConfigError::InvalidEnvVar("APPROVAL_TIMEOUT_SECS".into(), format!("{e}"))
                })?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => None,
        };

        let log_format = match get_optional(env, "LOG_FORMAT").as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            slack,
            approvers,
            context: RunContext::from_source(env),
            host,
            port,
            timeout,
            log_format,
            sentry_dsn: get_optional(env, "SENTRY_DSN"),
            sentry_environment: get_optional(env, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Get the socket address for the interactions endpoint.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl SlackConfig {
    fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bot_token = SecretString::from(get_required(env, "SLACK_BOT_TOKEN")?);
        let channel_id = get_required(env, "SLACK_CHANNEL_ID")?;
        let app_token = get_optional(env, "SLACK_APP_TOKEN").map(SecretString::from);
        let signing_secret = get_optional(env, "SLACK_SIGNING_SECRET").map(SecretString::from);

        if app_token.is_none() && signing_secret.is_none() {
            return Err(ConfigError::NoTransport);
        }

        Ok(Self {
            bot_token,
            channel_id,
            app_token,
            signing_secret,
        })
    }
}

impl RunContext {
    fn from_source(env: &dyn Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| env(key).unwrap_or_default();

        Self {
            actor: var("GITHUB_ACTOR"),
            workflow: var("GITHUB_WORKFLOW"),
            run_url: format!(
                "{}/{}/actions/runs/{}",
                var("GITHUB_SERVER_URL"),
                var("GITHUB_REPOSITORY"),
                var("GITHUB_RUN_ID")
            ),
            environment: var("ENVIRONMENT"),
            url: var("URL"),
            reason: var("REQUEST_REASON"),
        }
    }
}

/// Split an approver list on `::`, trimming names and dropping empty ones.
///
/// Order and duplicates are preserved; each entry becomes its own slot.
#[must_use]
pub fn parse_approvers(raw: &str) -> Vec<String> {
    raw.split(APPROVER_SEPARATOR)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

fn get_required(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String, ConfigError> {
    get_optional(env, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Read a variable, treating empty or whitespace-only values as unset.
fn get_optional(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    env(key).filter(|value| !value.trim().is_empty())
}
