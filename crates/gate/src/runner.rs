//! Wiring a run together.
//!
//! Startup is two-phase: the summary and every prompt are posted before any
//! event source is started, so no click can arrive for a prompt that does not
//! exist yet. After that the next click, the event source, the optional
//! deadline and the shutdown signal race. A click that wins is applied to
//! completion before anything else is polled, so a decision that has been
//! recorded is never discarded by a timeout or a signal.

use std::future::Future;
use std::time::Duration;

use approval_gate_core::{ActionEvent, ApprovalRun};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::{GateConfig, Transport};
use crate::error::GateError;
use crate::lifecycle::GateOutcome;
use crate::notifier::Notifier;
use crate::routes::{self, InteractionState};
use crate::services::{Coordinator, post_request};
use crate::slack::{SlackClient, socket};

/// Button presses buffered between a transport and the coordinator.
const EVENT_BUFFER: usize = 64;

/// Run the gate end to end with the configured transport.
pub async fn run_gate(config: &GateConfig, slack: SlackClient) -> GateOutcome {
    let run = match ApprovalRun::new(&config.approvers) {
        Ok(run) => run,
        Err(e) => return GateOutcome::Failed(GateError::from(e).to_string()),
    };

    let posted = match post_request(&slack, &config.slack.channel_id, &config.context, &run).await
    {
        Ok(posted) => posted,
        Err(e) => return GateOutcome::Failed(GateError::from(e).to_string()),
    };

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let transport = config.slack.transport();
    let addr = config.socket_addr();
    let source_client = slack.clone();
    let source = async move {
        match transport {
            Transport::SocketMode => socket::listen(source_client, tx)
                .await
                .map_err(GateError::from),
            Transport::Interactions => {
                routes::serve(addr, InteractionState::new(source_client, tx)).await
            }
        }
    };

    info!(
        transport = ?transport,
        approvers = run.slots().len(),
        "Waiting for approvals"
    );

    let coordinator = Coordinator::new(run, posted, slack);
    supervise(coordinator, rx, source, config.timeout, shutdown_signal()).await
}

/// Race the coordinator's events against the source, deadline and shutdown.
///
/// Only waiting for the next event is cancellable; applying one is not. A
/// queued event wins ties. On timeout every undecided prompt is marked
/// expired before returning.
pub async fn supervise<N, S, F>(
    mut coordinator: Coordinator<N>,
    mut events: mpsc::Receiver<ActionEvent>,
    source: S,
    timeout: Option<Duration>,
    shutdown: F,
) -> GateOutcome
where
    N: Notifier,
    S: Future<Output = Result<(), GateError>>,
    F: Future<Output = ()>,
{
    let deadline = async {
        match timeout {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };

    tokio::pin!(source);
    tokio::pin!(deadline);
    tokio::pin!(shutdown);

    loop {
        let event = tokio::select! {
            biased;
            event = events.recv() => event,
            result = &mut source => {
                return match result {
                    Ok(()) => GateOutcome::Failed(
                        "event source stopped before a decision was reached".to_string(),
                    ),
                    Err(e) => GateOutcome::Failed(e.to_string()),
                };
            }
            () = &mut deadline => {
                warn!("Approval timeout elapsed");
                return coordinator.expire().await;
            }
            () = &mut shutdown => return GateOutcome::Cancelled,
        };

        let Some(event) = event else {
            return GateOutcome::Failed(
                "event source closed before a decision was reached".to_string(),
            );
        };

        if let Some(outcome) = coordinator.apply(&event).await {
            return outcome;
        }
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// If a handler cannot be installed that signal never fires.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, cancelling approval request");
}
