//! Live connections grouped by chat.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::Message;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::connection::{Connection, ConnectionError, ConnectionId};
use super::protocol::ServerEnvelope;

/// Outcome of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub evicted: usize,
}

/// A connection appears under at most one chat and only while its session is active.
/// Chats with no connections are dropped from the map.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    chats: Mutex<HashMap<String, HashMap<ConnectionId, Arc<Connection>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, connection: Arc<Connection>) {
        let mut chats = self.chats.lock().await;
        chats
            .entry(connection.chat_id().to_string())
            .or_default()
            .insert(connection.id(), connection);
    }

    /// Remove a connection; returns false if it was not registered.
    pub async fn unregister(&self, connection: &Connection) -> bool {
        let mut chats = self.chats.lock().await;
        let Some(set) = chats.get_mut(connection.chat_id()) else {
            return false;
        };
        let removed = set.remove(&connection.id()).is_some();
        if set.is_empty() {
            chats.remove(connection.chat_id());
        }
        removed
    }

    /// Serialize once and write to every connection of the chat.
    ///
    /// Writes happen under the registry lock so all sessions see broadcasts in
    /// the same order. A connection whose write fails or misses the deadline is
    /// evicted and closed; delivery to the rest continues.
    pub async fn broadcast(
        &self,
        chat_id: &str,
        envelope: &ServerEnvelope,
        write_wait: Duration,
    ) -> Result<BroadcastReport, ConnectionError> {
        let payload = serde_json::to_string(envelope)?;
        let mut report = BroadcastReport::default();

        let evicted = {
            let mut chats = self.chats.lock().await;
            let Some(set) = chats.get_mut(chat_id) else {
                return Ok(report);
            };

            let mut failed = Vec::new();
            for (id, connection) in set.iter() {
                match connection.send(Message::Text(payload.clone()), write_wait).await {
                    Ok(()) => report.delivered += 1,
                    Err(error) => {
                        warn!(
                            chat_id = %chat_id,
                            connection = %id,
                            user_id = %connection.user_id(),
                            error = %error,
                            "Evicting connection after failed write"
                        );
                        failed.push(*id);
                    }
                }
            }

            let evicted: Vec<Arc<Connection>> =
                failed.iter().filter_map(|id| set.remove(id)).collect();
            if set.is_empty() {
                chats.remove(chat_id);
            }
            evicted
        };

        report.evicted = evicted.len();
        for connection in evicted {
            connection.close(None, write_wait).await;
        }

        debug!(chat_id = %chat_id, delivered = report.delivered, evicted = report.evicted, "Broadcast complete");
        Ok(report)
    }

    pub async fn connection_count(&self, chat_id: &str) -> usize {
        self.chats
            .lock()
            .await
            .get(chat_id)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    pub async fn chat_count(&self) -> usize {
        self.chats.lock().await.len()
    }
}
