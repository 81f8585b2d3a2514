//! A single live socket's write half, shared between the registry, the
//! keep-alive task and the session that owns it.

use std::fmt;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message};
use axum::BoxError;
use futures_util::{Sink, SinkExt};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use uuid::Uuid;

pub type ConnectionId = Uuid;

type BoxedSink = Pin<Box<dyn Sink<Message, Error = axum::Error> + Send>>;

/// The authenticated user and the chat a session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionIdentity {
    pub chat_id: String,
    pub user_id: String,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection already closed")]
    Closed,

    #[error("write did not complete within {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),

    #[error("failed to encode frame: {0}")]
    Encode(#[from] serde_json::Error),
}

pub struct Connection {
    id: ConnectionId,
    identity: SessionIdentity,
    sink: Mutex<BoxedSink>,
    closing: AtomicBool,
    closed_tx: watch::Sender<bool>,
}

impl Connection {
    pub fn new<S>(identity: SessionIdentity, sink: S) -> Arc<Self>
    where
        S: Sink<Message> + Send + 'static,
        S::Error: Into<BoxError>,
    {
        let (closed_tx, _) = watch::channel(false);
        Arc::new(Self {
            id: Uuid::new_v4(),
            identity,
            sink: Mutex::new(Box::pin(sink.sink_map_err(axum::Error::new))),
            closing: AtomicBool::new(false),
            closed_tx,
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> &SessionIdentity {
        &self.identity
    }

    pub fn chat_id(&self) -> &str {
        &self.identity.chat_id
    }

    pub fn user_id(&self) -> &str {
        &self.identity.user_id
    }

    pub fn is_closed(&self) -> bool {
        self.closing.load(Ordering::Acquire)
    }

    /// Write one frame; waiting for the writer lock counts against the deadline.
    pub async fn send(&self, frame: Message, deadline: Duration) -> Result<(), ConnectionError> {
        if self.is_closed() {
            return Err(ConnectionError::Closed);
        }

        tokio::time::timeout(deadline, async {
            let mut sink = self.sink.lock().await;
            sink.send(frame).await
        })
        .await
        .map_err(|_| ConnectionError::Timeout(deadline))??;

        Ok(())
    }

    /// Close the socket. Only the first call does anything; returns whether it was this one.
    pub async fn close(&self, frame: Option<CloseFrame<'static>>, deadline: Duration) -> bool {
        if self.closing.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.closed_tx.send_replace(true);

        let flushed = tokio::time::timeout(deadline, async {
            let mut sink = self.sink.lock().await;
            let _ = sink.send(Message::Close(frame)).await;
            sink.close().await
        })
        .await;

        if !matches!(flushed, Ok(Ok(()))) {
            tracing::debug!(connection = %self.id, "socket did not close cleanly");
        }
        true
    }

    /// Resolves once [`Connection::close`] has been called.
    pub async fn closed(&self) {
        let mut rx = self.closed_tx.subscribe();
        // The sender lives in `self`, so the channel cannot be dropped here.
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("identity", &self.identity)
            .field("closed", &self.is_closed())
            .finish()
    }
}
