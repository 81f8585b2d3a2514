//! Upgrade handling and the lifecycle of one chat session.

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::BoxError;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::connection::{Connection, SessionIdentity};
use super::protocol::{
    ServerEnvelope, CLOSE_ACCESS_DENIED, CLOSE_AUTH_FAILED, CLOSE_CHAT_ID_MISSING,
};
use super::pump::{self, PumpExit};
use super::registry::ConnectionRegistry;
use super::{keepalive, RealtimeState};
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct SocketQuery {
    pub token: Option<String>,
}

/// Why a session was refused after the upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    AuthFailed,
    ChatIdMissing,
    AccessDenied,
}

impl Rejection {
    pub fn code(self) -> u16 {
        match self {
            Rejection::AuthFailed => CLOSE_AUTH_FAILED,
            Rejection::ChatIdMissing => CLOSE_CHAT_ID_MISSING,
            Rejection::AccessDenied => CLOSE_ACCESS_DENIED,
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Rejection::AuthFailed => "Auth failed",
            Rejection::ChatIdMissing => "Chat ID not provided",
            Rejection::AccessDenied => "Access denied",
        }
    }
}

/// `GET /ws/{chat_id}?token=...`
pub async fn chat_socket(
    State(state): State<Arc<GatewayState>>,
    chat_id: Option<Path<String>>,
    Query(query): Query<SocketQuery>,
    ws: WebSocketUpgrade,
) -> Response {
    let realtime = state.realtime().clone();
    let chat_id = chat_id.map(|Path(chat_id)| chat_id);

    ws.max_message_size(realtime.settings.max_message_size)
        .on_failed_upgrade(|error| warn!(error = %error, "WebSocket upgrade failed"))
        .on_upgrade(move |socket: WebSocket| async move {
            let (sink, stream) = socket.split();
            run_session(realtime, sink, stream, query.token, chat_id).await;
        })
}

/// Drive one upgraded socket from authentication to teardown.
pub async fn run_session<Si, St>(
    state: RealtimeState,
    sink: Si,
    mut stream: St,
    token: Option<String>,
    chat_id: Option<String>,
) where
    Si: Sink<Message> + Send + 'static,
    Si::Error: Into<BoxError>,
    St: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let write_wait = state.settings.write_wait;

    let identity = match authorize(&state, token.as_deref(), chat_id.as_deref()).await {
        Ok(identity) => identity,
        Err(rejection) => {
            info!(code = rejection.code(), reason = rejection.reason(), "Rejecting chat session");
            reject(sink, rejection, write_wait).await;
            return;
        }
    };

    let connection = Connection::new(identity, sink);
    state.registry.register(connection.clone()).await;
    info!(
        chat_id = %connection.chat_id(),
        user_id = %connection.user_id(),
        connection = %connection.id(),
        "Chat session started"
    );

    let keepalive = keepalive::spawn(connection.clone(), state.settings.ping_period, write_wait);
    let teardown = Teardown::new(state.registry.clone(), connection.clone(), keepalive, write_wait);

    let exit = match prime(&state, &connection).await {
        Ok(()) => pump::run(&state, &connection, &mut stream).await,
        Err(exit) => exit,
    };

    teardown.finish().await;
    info!(
        chat_id = %connection.chat_id(),
        user_id = %connection.user_id(),
        connection = %connection.id(),
        exit = ?exit,
        "Chat session ended"
    );
}

/// Authenticate the token, then check the chat id and membership.
pub async fn authorize(
    state: &RealtimeState,
    token: Option<&str>,
    chat_id: Option<&str>,
) -> Result<SessionIdentity, Rejection> {
    let credentials = &state.collaborators.credentials;

    let token = token.filter(|t| !t.is_empty()).ok_or(Rejection::AuthFailed)?;
    match credentials.is_revoked(token).await {
        Ok(false) => {}
        Ok(true) => {
            debug!("Token has been revoked");
            return Err(Rejection::AuthFailed);
        }
        Err(error) => {
            warn!(error = %error, "Revocation check failed");
            return Err(Rejection::AuthFailed);
        }
    }
    let identity = credentials.validate(token).await.map_err(|error| {
        debug!(error = %error, "Token validation failed");
        Rejection::AuthFailed
    })?;

    let chat_id = chat_id
        .filter(|c| !c.is_empty())
        .ok_or(Rejection::ChatIdMissing)?;

    match state
        .collaborators
        .membership
        .is_member(chat_id, &identity.user_id)
        .await
    {
        Ok(true) => Ok(SessionIdentity {
            chat_id: chat_id.to_string(),
            user_id: identity.user_id,
        }),
        Ok(false) => Err(Rejection::AccessDenied),
        Err(error) => {
            warn!(chat_id = %chat_id, error = %error, "Membership check failed");
            Err(Rejection::AccessDenied)
        }
    }
}

async fn reject<Si>(sink: Si, rejection: Rejection, write_wait: Duration)
where
    Si: Sink<Message>,
{
    let mut sink = Box::pin(sink);
    let frame = CloseFrame {
        code: rejection.code(),
        reason: Cow::Borrowed(rejection.reason()),
    };
    let _ = tokio::time::timeout(write_wait, async {
        sink.send(Message::Close(Some(frame))).await?;
        sink.close().await
    })
    .await;
}

/// Push chat info and recent history before reading.
async fn prime(state: &RealtimeState, connection: &Connection) -> Result<(), PumpExit> {
    let collaborators = &state.collaborators;
    let write_wait = state.settings.write_wait;

    match collaborators.membership.list_members(connection.chat_id()).await {
        Ok(members) => {
            if let Some(other) = members
                .into_iter()
                .find(|member| member.user_id != connection.user_id())
            {
                push(connection, ServerEnvelope::ChatInfo { name: other.display_name }, write_wait).await?;
            }
        }
        Err(error) => warn!(chat_id = %connection.chat_id(), error = %error, "Could not load chat members"),
    }

    match collaborators
        .store
        .recent_history(connection.chat_id(), state.settings.history_limit)
        .await
    {
        Ok(messages) => push(connection, ServerEnvelope::History { messages }, write_wait).await?,
        Err(error) => warn!(chat_id = %connection.chat_id(), error = %error, "Could not load history"),
    }

    Ok(())
}

async fn push(connection: &Connection, envelope: ServerEnvelope, write_wait: Duration) -> Result<(), PumpExit> {
    let frame = envelope
        .to_frame()
        .map_err(|e| PumpExit::WriteFailed(e.to_string()))?;
    connection
        .send(frame, write_wait)
        .await
        .map_err(|e| PumpExit::WriteFailed(e.to_string()))
}

/// Unregisters and closes the connection exactly once, even if the session
/// future is dropped before [`Teardown::finish`] runs.
struct Teardown {
    registry: Arc<ConnectionRegistry>,
    connection: Arc<Connection>,
    keepalive: Option<JoinHandle<()>>,
    write_wait: Duration,
    done: bool,
}

impl Teardown {
    fn new(
        registry: Arc<ConnectionRegistry>,
        connection: Arc<Connection>,
        keepalive: JoinHandle<()>,
        write_wait: Duration,
    ) -> Self {
        Self {
            registry,
            connection,
            keepalive: Some(keepalive),
            write_wait,
            done: false,
        }
    }

    async fn finish(mut self) {
        self.done = true;
        if let Some(task) = self.keepalive.take() {
            task.abort();
        }
        self.registry.unregister(&self.connection).await;
        self.connection.close(None, self.write_wait).await;
    }
}

impl Drop for Teardown {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(task) = self.keepalive.take() {
            task.abort();
        }
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let registry = self.registry.clone();
            let connection = self.connection.clone();
            let write_wait = self.write_wait;
            handle.spawn(async move {
                registry.unregister(&connection).await;
                connection.close(None, write_wait).await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use tokio::sync::mpsc;

    use super::*;
    use crate::realtime::ports::MessageStore;
    use crate::realtime::testing::{channel_sink, test_state, FakeBackend};

    fn backend() -> Arc<FakeBackend> {
        Arc::new(
            FakeBackend::default()
                .with_user("tok-a", "alice", "Alice")
                .with_user("tok-b", "bob", "Bob")
                .with_user("tok-c", "carol", "Carol")
                .with_chat("c1", &["alice", "bob"]),
        )
    }

    fn close_code(frame: Option<Message>) -> Option<u16> {
        match frame {
            Some(Message::Close(Some(frame))) => Some(frame.code),
            _ => None,
        }
    }

    async fn rejected_with(backend: Arc<FakeBackend>, token: Option<&str>, chat_id: Option<&str>) -> Option<u16> {
        let state = test_state(backend);
        let (sink, mut frames) = channel_sink();
        run_session(
            state.clone(),
            sink,
            stream::empty::<Result<Message, axum::Error>>(),
            token.map(str::to_string),
            chat_id.map(str::to_string),
        )
        .await;
        assert_eq!(state.registry.chat_count().await, 0);
        close_code(frames.recv().await)
    }

    #[tokio::test]
    async fn handshake_failures_close_with_distinct_codes() {
        assert_eq!(rejected_with(backend(), None, Some("c1")).await, Some(4001));
        assert_eq!(rejected_with(backend(), Some(""), Some("c1")).await, Some(4001));
        assert_eq!(rejected_with(backend(), Some("forged"), Some("c1")).await, Some(4001));
        assert_eq!(rejected_with(backend(), Some("tok-a"), None).await, Some(4002));
        assert_eq!(rejected_with(backend(), Some("tok-a"), Some("")).await, Some(4002));
        assert_eq!(rejected_with(backend(), Some("tok-c"), Some("c1")).await, Some(4003));
        assert_eq!(rejected_with(backend(), Some("tok-a"), Some("missing")).await, Some(4003));
    }

    #[tokio::test]
    async fn revoked_tokens_are_refused() {
        let backend = backend();
        backend.revoke("tok-a");
        assert_eq!(rejected_with(backend, Some("tok-a"), Some("c1")).await, Some(4001));
    }

    #[tokio::test]
    async fn bad_token_wins_over_missing_chat_id() {
        assert_eq!(rejected_with(backend(), None, None).await, Some(4001));
    }

    #[tokio::test]
    async fn accepted_session_gets_info_then_history_and_cleans_up() {
        let backend = backend();
        let state = test_state(backend.clone());
        backend.append("c1", "bob", "earlier").await.unwrap();

        let (sink, mut frames) = channel_sink();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<Result<Message, axum::Error>>();
        let inbound = Box::pin(stream::unfold(inbound_rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        }));

        let session = tokio::spawn(run_session(
            state.clone(),
            sink,
            inbound,
            Some("tok-a".to_string()),
            Some("c1".to_string()),
        ));

        let info: serde_json::Value = match frames.recv().await {
            Some(Message::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        };
        assert_eq!(info["type"], "chat_info");
        assert_eq!(info["name"], "Bob");

        let history: serde_json::Value = match frames.recv().await {
            Some(Message::Text(text)) => serde_json::from_str(&text).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        };
        assert_eq!(history["type"], "history");
        assert_eq!(history["messages"][0]["text"], "earlier");
        assert_eq!(state.registry.connection_count("c1").await, 1);

        drop(inbound_tx);
        tokio::time::timeout(Duration::from_secs(2), session)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(state.registry.chat_count().await, 0);
        assert_eq!(frames.recv().await, Some(Message::Close(None)));
    }

    #[test]
    fn rejection_codes() {
        assert_eq!(Rejection::AuthFailed.code(), 4001);
        assert_eq!(Rejection::ChatIdMissing.code(), 4002);
        assert_eq!(Rejection::AccessDenied.code(), 4003);
    }
}
