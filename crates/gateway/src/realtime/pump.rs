//! Inbound loop of an active session.

use std::sync::Arc;

use axum::extract::ws::Message;
use futures_util::{Stream, StreamExt};
use parley_chats::ChatMessage;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use super::connection::{Connection, ConnectionError};
use super::ports::PortError;
use super::protocol::{ClientEnvelope, ServerEnvelope};
use super::RealtimeState;

/// Why the read loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PumpExit {
    /// The handle was closed elsewhere: eviction, failed ping or shutdown.
    Closed,
    PeerClosed,
    StreamEnded,
    /// No pong arrived within the pong wait.
    ReadTimeout,
    ReadError(String),
    WriteFailed(String),
}

/// Read frames until the socket ends, the read deadline passes or the handle is closed.
///
/// The read deadline starts at `pong_wait` and is pushed forward only by pongs.
pub async fn run<St>(state: &RealtimeState, connection: &Arc<Connection>, stream: &mut St) -> PumpExit
where
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let pong_wait = state.settings.pong_wait;
    let mut deadline = Instant::now() + pong_wait;

    loop {
        let next = tokio::select! {
            _ = connection.closed() => return PumpExit::Closed,
            next = timeout_at(deadline, stream.next()) => next,
        };

        let frame = match next {
            Err(_) => return PumpExit::ReadTimeout,
            Ok(None) => return PumpExit::StreamEnded,
            Ok(Some(Err(error))) => return PumpExit::ReadError(error.to_string()),
            Ok(Some(Ok(frame))) => frame,
        };

        let handled = match frame {
            Message::Pong(_) => {
                deadline = Instant::now() + pong_wait;
                Ok(())
            }
            // Pings are answered by the socket itself.
            Message::Ping(_) => Ok(()),
            Message::Close(_) => return PumpExit::PeerClosed,
            Message::Text(text) => handle_frame(state, connection, text.as_bytes()).await,
            Message::Binary(bytes) => handle_frame(state, connection, &bytes).await,
        };

        if let Err(error) = handled {
            return match error {
                ConnectionError::Closed => PumpExit::Closed,
                other => PumpExit::WriteFailed(other.to_string()),
            };
        }
    }
}

/// Decode and act on one client frame. Only transport failures are returned;
/// everything else is reported to the sender as an error envelope.
async fn handle_frame(
    state: &RealtimeState,
    connection: &Arc<Connection>,
    raw: &[u8],
) -> Result<(), ConnectionError> {
    let envelope = match ClientEnvelope::decode(raw) {
        Ok(envelope) => envelope,
        Err(error) => {
            debug!(connection = %connection.id(), error = %error, "Rejected client frame");
            return reply(state, connection, ServerEnvelope::error(error.to_string())).await;
        }
    };

    match envelope {
        ClientEnvelope::Message { text } => {
            if text.trim().is_empty() {
                return reply(state, connection, ServerEnvelope::error("message text must not be empty")).await;
            }

            match send_message(state, connection, &text).await {
                Ok(message) => {
                    let envelope = ServerEnvelope::Message { message };
                    state
                        .registry
                        .broadcast(connection.chat_id(), &envelope, state.settings.write_wait)
                        .await?;
                    Ok(())
                }
                Err(error) => {
                    warn!(
                        chat_id = %connection.chat_id(),
                        user_id = %connection.user_id(),
                        error = %error,
                        "Failed to send message"
                    );
                    reply(state, connection, ServerEnvelope::error(error.to_string())).await
                }
            }
        }
    }
}

/// Authorize, persist and enrich one outgoing message.
async fn send_message(
    state: &RealtimeState,
    connection: &Connection,
    text: &str,
) -> Result<ChatMessage, PortError> {
    let collaborators = &state.collaborators;
    let chat_id = connection.chat_id();
    let user_id = connection.user_id();

    if !collaborators.membership.is_member(chat_id, user_id).await? {
        return Err(PortError::Rejected("user is not a member of this chat".to_string()));
    }

    let mut message = collaborators.store.append(chat_id, user_id, text).await?;

    match collaborators.identities.display_name(user_id).await {
        Ok(name) => message.login = name,
        Err(error) => debug!(user_id = %user_id, error = %error, "Keeping stored sender name"),
    }

    Ok(message)
}

async fn reply(
    state: &RealtimeState,
    connection: &Connection,
    envelope: ServerEnvelope,
) -> Result<(), ConnectionError> {
    connection
        .send(envelope.to_frame()?, state.settings.write_wait)
        .await
}
