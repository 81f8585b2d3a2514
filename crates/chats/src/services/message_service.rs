//! Message persistence and history.

use parley_database::{ChatMessage, MessageRepository, SqlitePool};

use crate::types::{ChatError, ChatResult};

#[derive(Clone)]
pub struct MessageService {
    messages: MessageRepository,
}

impl MessageService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            messages: MessageRepository::new(pool),
        }
    }

    /// Persist a message. Membership is the caller's concern.
    pub async fn append(&self, chat_id: &str, user_id: &str, text: &str) -> ChatResult<ChatMessage> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        Ok(self.messages.create(chat_id, user_id, text).await?)
    }

    /// Up to `limit` of the latest messages, oldest first
    pub async fn recent_history(&self, chat_id: &str, limit: u32) -> ChatResult<Vec<ChatMessage>> {
        let mut messages = self.messages.recent_by_chat(chat_id, limit).await?;
        messages.reverse();
        Ok(messages)
    }
}
