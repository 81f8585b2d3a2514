//! In-memory sinks and port fakes for unit tests.

use std::collections::{HashMap, HashSet};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::ws::Message;
use futures_util::Sink;
use parley_chats::ChatMessage;
use tokio::sync::mpsc;

use super::ports::{
    Collaborators, CredentialValidator, Identity, IdentityLookup, MembershipOracle, MessageStore,
    Participant, PortError,
};
use super::registry::ConnectionRegistry;
use super::{RealtimeSettings, RealtimeState};

pub(crate) fn channel_sink() -> (
    impl Sink<Message, Error = axum::Error> + Send + 'static,
    mpsc::UnboundedReceiver<Message>,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let sink = futures_util::sink::unfold(tx, |tx, frame: Message| async move {
        tx.send(frame).map_err(axum::Error::new)?;
        Ok::<_, axum::Error>(tx)
    });
    (sink, rx)
}

/// A dead socket: every sink operation fails, on every call.
struct FailingSink;

fn peer_gone() -> axum::Error {
    axum::Error::new(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        "peer gone",
    ))
}

impl Sink<Message> for FailingSink {
    type Error = axum::Error;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Err(peer_gone()))
    }

    fn start_send(self: Pin<&mut Self>, _item: Message) -> Result<(), Self::Error> {
        Err(peer_gone())
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Err(peer_gone()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Err(peer_gone()))
    }
}

pub(crate) fn failing_sink() -> impl Sink<Message, Error = axum::Error> + Send + 'static {
    FailingSink
}

pub(crate) fn stalled_sink() -> impl Sink<Message, Error = axum::Error> + Send + 'static {
    futures_util::sink::unfold((), |(), _frame: Message| async move {
        std::future::pending::<Result<(), axum::Error>>().await
    })
}

#[derive(Default)]
struct Inner {
    tokens: HashMap<String, String>,
    revoked: HashSet<String>,
    names: HashMap<String, String>,
    chats: HashMap<String, Vec<String>>,
    messages: Vec<ChatMessage>,
}

#[derive(Default)]
pub(crate) struct FakeBackend {
    inner: Mutex<Inner>,
}

impl FakeBackend {
    pub(crate) fn with_user(self, token: &str, user_id: &str, name: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.tokens.insert(token.to_string(), user_id.to_string());
            inner.names.insert(user_id.to_string(), name.to_string());
        }
        self
    }

    pub(crate) fn with_chat(self, chat_id: &str, members: &[&str]) -> Self {
        self.inner.lock().unwrap().chats.insert(
            chat_id.to_string(),
            members.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub(crate) fn revoke(&self, token: &str) {
        self.inner.lock().unwrap().revoked.insert(token.to_string());
    }

    pub(crate) fn remove_member(&self, chat_id: &str, user_id: &str) {
        if let Some(members) = self.inner.lock().unwrap().chats.get_mut(chat_id) {
            members.retain(|m| m != user_id);
        }
    }

    pub(crate) fn stored(&self) -> Vec<ChatMessage> {
        self.inner.lock().unwrap().messages.clone()
    }
}

#[async_trait]
impl CredentialValidator for FakeBackend {
    async fn validate(&self, token: &str) -> Result<Identity, PortError> {
        let inner = self.inner.lock().unwrap();
        inner
            .tokens
            .get(token)
            .map(|user_id| Identity {
                user_id: user_id.clone(),
                role: "user".to_string(),
            })
            .ok_or_else(|| PortError::Unauthenticated("unknown token".to_string()))
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, PortError> {
        Ok(self.inner.lock().unwrap().revoked.contains(token))
    }
}

#[async_trait]
impl MembershipOracle for FakeBackend {
    async fn is_member(&self, chat_id: &str, user_id: &str) -> Result<bool, PortError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .chats
            .get(chat_id)
            .is_some_and(|members| members.iter().any(|m| m == user_id)))
    }

    async fn list_members(&self, chat_id: &str) -> Result<Vec<Participant>, PortError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .chats
            .get(chat_id)
            .into_iter()
            .flatten()
            .map(|user_id| Participant {
                user_id: user_id.clone(),
                display_name: inner.names.get(user_id).cloned().unwrap_or_default(),
            })
            .collect())
    }
}

#[async_trait]
impl MessageStore for FakeBackend {
    async fn append(&self, chat_id: &str, user_id: &str, text: &str) -> Result<ChatMessage, PortError> {
        let mut inner = self.inner.lock().unwrap();
        let message = ChatMessage {
            id: format!("m{}", inner.messages.len() + 1),
            chat_id: chat_id.to_string(),
            user_id: user_id.to_string(),
            login: user_id.to_string(),
            text: text.to_string(),
            sending_time: "2024-01-01T00:00:00.000000Z".to_string(),
            updated_at: None,
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn recent_history(&self, chat_id: &str, limit: u32) -> Result<Vec<ChatMessage>, PortError> {
        let inner = self.inner.lock().unwrap();
        let matching: Vec<ChatMessage> = inner
            .messages
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect();
        let skip = matching.len().saturating_sub(limit as usize);
        Ok(matching.into_iter().skip(skip).collect())
    }
}

#[async_trait]
impl IdentityLookup for FakeBackend {
    async fn display_name(&self, user_id: &str) -> Result<String, PortError> {
        self.inner
            .lock()
            .unwrap()
            .names
            .get(user_id)
            .cloned()
            .ok_or_else(|| PortError::Rejected("user not found".to_string()))
    }
}

pub(crate) fn test_state(backend: Arc<FakeBackend>) -> RealtimeState {
    RealtimeState {
        registry: Arc::new(ConnectionRegistry::new()),
        collaborators: Collaborators {
            credentials: backend.clone(),
            membership: backend.clone(),
            store: backend.clone(),
            identities: backend,
        },
        settings: RealtimeSettings {
            pong_wait: Duration::from_secs(5),
            write_wait: Duration::from_secs(1),
            ping_period: Duration::from_millis(4500),
            max_message_size: 1024,
            history_limit: 50,
        },
    }
}
