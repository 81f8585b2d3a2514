//! Error types for the chat system.

use parley_database::DatabaseError;
use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Main error type for the chat system
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Chat not found: {id}")]
    ChatNotFound { id: String },

    #[error("User not found: {login}")]
    UserNotFound { login: String },

    #[error("Cannot create a chat with yourself")]
    SelfChat,

    #[error("User is not a member of this chat")]
    NotAMember,

    #[error("Message text must not be empty")]
    EmptyMessage,
}

impl ChatError {
    pub fn chat_not_found(id: impl Into<String>) -> Self {
        Self::ChatNotFound { id: id.into() }
    }

    pub fn user_not_found(login: impl Into<String>) -> Self {
        Self::UserNotFound {
            login: login.into(),
        }
    }
}
