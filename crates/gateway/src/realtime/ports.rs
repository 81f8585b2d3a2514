//! Capabilities the live-session core consumes without knowing who provides them.

use std::sync::Arc;

use async_trait::async_trait;
use parley_chats::ChatMessage;
use thiserror::Error;

/// Who a bearer credential belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub role: String,
}

/// A chat member as the other side should see them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug, Error)]
pub enum PortError {
    #[error("credential rejected: {0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Rejected(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, token: &str) -> Result<Identity, PortError>;

    async fn is_revoked(&self, token: &str) -> Result<bool, PortError>;
}

#[async_trait]
pub trait MembershipOracle: Send + Sync {
    async fn is_member(&self, chat_id: &str, user_id: &str) -> Result<bool, PortError>;

    async fn list_members(&self, chat_id: &str) -> Result<Vec<Participant>, PortError>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message; the returned value carries the server-assigned id and time.
    async fn append(&self, chat_id: &str, user_id: &str, text: &str) -> Result<ChatMessage, PortError>;

    /// Up to `limit` latest messages, oldest first.
    async fn recent_history(&self, chat_id: &str, limit: u32) -> Result<Vec<ChatMessage>, PortError>;
}

#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn display_name(&self, user_id: &str) -> Result<String, PortError>;
}

/// The four providers a session runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub credentials: Arc<dyn CredentialValidator>,
    pub membership: Arc<dyn MembershipOracle>,
    pub store: Arc<dyn MessageStore>,
    pub identities: Arc<dyn IdentityLookup>,
}
