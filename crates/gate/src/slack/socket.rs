//! Socket Mode listener.
//!
//! CI runners usually cannot receive inbound HTTP, so with an app-level token
//! the gate opens an outbound WebSocket to Slack instead. Every envelope is
//! acknowledged as soon as it is read, then its button presses are forwarded
//! to the coordinator.
//!
//! See: <https://api.slack.com/apis/socket-mode>

use std::time::Duration;

use approval_gate_core::ActionEvent;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, instrument, warn};

use super::client::SlackClient;
use super::error::SlackError;
use super::types::SocketEnvelope;

/// Consecutive failed connection attempts before giving up.
pub const MAX_CONNECT_ATTEMPTS: u32 = 5;

/// Base delay between reconnection attempts (multiplied by the attempt).
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// How a single connection ended.
enum SessionEnd {
    /// Slack asked us to reconnect, or the socket dropped.
    Reconnect,
    /// The coordinator stopped listening; nothing left to do.
    ReceiverClosed,
}

/// Listen for button presses over Socket Mode until the receiver is dropped.
///
/// Reconnects whenever Slack sends `disconnect` or the socket closes.
///
/// # Errors
///
/// Returns error after [`MAX_CONNECT_ATTEMPTS`] consecutive failures to open
/// or connect a socket.
#[instrument(skip_all)]
pub async fn listen(
    client: SlackClient,
    events: mpsc::Sender<ActionEvent>,
) -> Result<(), SlackError> {
    let mut failures: u32 = 0;

    loop {
        match connect_once(&client, &events).await {
            Ok(SessionEnd::ReceiverClosed) => return Ok(()),
            Ok(SessionEnd::Reconnect) => {
                failures = 0;
                debug!("Reconnecting Socket Mode");
            }
            Err(e) => {
                failures += 1;
                warn!(error = %e, attempt = failures, "Socket Mode connection failed");
                if failures >= MAX_CONNECT_ATTEMPTS {
                    return Err(SlackError::Socket(format!(
                        "giving up after {failures} attempts: {e}"
                    )));
                }
                tokio::time::sleep(RECONNECT_DELAY * failures).await;
            }
        }
    }
}

async fn connect_once(
    client: &SlackClient,
    events: &mpsc::Sender<ActionEvent>,
) -> Result<SessionEnd, SlackError> {
    let url = client.open_socket_connection().await?;
    let (stream, _) = connect_async(url.as_str())
        .await
        .map_err(|e| SlackError::Socket(e.to_string()))?;
    let (mut write, mut read) = stream.split();

    while let Some(frame) = read.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => {
                info!("Slack closed the socket");
                return Ok(SessionEnd::Reconnect);
            }
            Ok(_) => continue,
            Err(e) => {
                warn!(error = %e, "Socket Mode read error");
                return Ok(SessionEnd::Reconnect);
            }
        };

        let envelope = match SocketEnvelope::parse(&text) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable Socket Mode frame");
                continue;
            }
        };

        if let Some(ack) = envelope.ack() {
            write
                .send(Message::Text(ack))
                .await
                .map_err(|e| SlackError::Socket(e.to_string()))?;
        }

        if envelope.is_hello() {
            info!("Socket Mode connected");
            continue;
        }
        if envelope.is_disconnect() {
            info!(reason = ?envelope.reason, "Slack requested disconnect");
            return Ok(SessionEnd::Reconnect);
        }

        let interaction = match envelope.interaction() {
            Ok(Some(interaction)) => interaction,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed interaction");
                continue;
            }
        };

        debug!(message = ?interaction.message_handle(), "Interaction received");
        for event in interaction.action_events() {
            if events.send(event).await.is_err() {
                return Ok(SessionEnd::ReceiverClosed);
            }
        }
    }

    Ok(SessionEnd::Reconnect)
}
