//! Approval gate - blocks a CI job on a Slack quorum approval.
//!
//! Exits 0 only when every approver has approved. Rejection, timeout,
//! cancellation and errors all exit non-zero and are annotated on the
//! workflow run.
//!
//! # Transports
//!
//! - Socket Mode when `SLACK_APP_TOKEN` is set (no inbound network needed)
//! - Otherwise a signed `POST /slack/interactions` endpoint on `PORT`

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use approval_gate::config::{GateConfig, LogFormat};
use approval_gate::slack::SlackClient;
use approval_gate::{host, lifecycle, runner};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &GateConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "approval_gate=info,approval_gate_core=info".into());

    let is_json = format == LogFormat::Json;
    let json_layer = is_json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider before any TLS operations. An error
    // only means one is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();

    // Local runs may keep their settings in .env
    dotenvy::dotenv().ok();

    let config = match GateConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            host::report_failure(&format!("Configuration error: {e}"));
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let slack = SlackClient::from_config(&config.slack);
    let outcome = runner::run_gate(&config, slack).await;

    lifecycle::finish(&outcome)
}
