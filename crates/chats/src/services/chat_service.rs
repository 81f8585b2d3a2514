//! Chat service for managing two-party chats.

use parley_database::{Chat, ChatMember, ChatRepository, ChatSummary, SqlitePool, UserRepository};
use tracing::info;

use crate::types::{ChatError, ChatResult};

/// Service for managing chat operations
#[derive(Clone)]
pub struct ChatService {
    chats: ChatRepository,
    users: UserRepository,
}

impl ChatService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            chats: ChatRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }

    /// Open a chat between `user_id` and the account named `target_login`.
    ///
    /// When the pair already shares a chat, that chat is returned instead of a
    /// second one being created.
    pub async fn create_with_login(&self, user_id: &str, target_login: &str) -> ChatResult<Chat> {
        let target = self
            .users
            .find_by_login(target_login)
            .await?
            .ok_or_else(|| ChatError::user_not_found(target_login))?;

        if target.id == user_id {
            return Err(ChatError::SelfChat);
        }

        if let Some(existing) = self.chats.find_between(user_id, &target.id).await? {
            info!(chat_id = %existing.id, user_id, "reusing existing chat");
            return Ok(existing);
        }

        Ok(self
            .chats
            .create_with_members(&[user_id, target.id.as_str()])
            .await?)
    }

    /// Delete a chat on behalf of one of its members
    pub async fn delete(&self, chat_id: &str, user_id: &str) -> ChatResult<()> {
        if self.chats.find_by_id(chat_id).await?.is_none() {
            return Err(ChatError::chat_not_found(chat_id));
        }

        if !self.chats.is_member(chat_id, user_id).await? {
            return Err(ChatError::NotAMember);
        }

        self.chats.delete(chat_id).await?;
        Ok(())
    }

    pub async fn list_for_user(&self, user_id: &str) -> ChatResult<Vec<ChatSummary>> {
        Ok(self.chats.list_for_user(user_id).await?)
    }

    pub async fn is_member(&self, chat_id: &str, user_id: &str) -> ChatResult<bool> {
        Ok(self.chats.is_member(chat_id, user_id).await?)
    }

    pub async fn members(&self, chat_id: &str) -> ChatResult<Vec<ChatMember>> {
        Ok(self.chats.members(chat_id).await?)
    }
}
