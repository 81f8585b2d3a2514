//! Port implementations backed by the account and chat services.

use async_trait::async_trait;
use parley_chats::{ChatError, ChatMessage, ChatService, MessageService};
use parley_users::{AuthError, AuthService, UserError, UserService};

use super::ports::{
    CredentialValidator, Identity, IdentityLookup, MembershipOracle, MessageStore, Participant,
    PortError,
};

impl From<AuthError> for PortError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidToken(reason) => PortError::Unauthenticated(reason),
            AuthError::TokenRevoked => PortError::Unauthenticated("token revoked".to_string()),
            other => PortError::Unavailable(other.to_string()),
        }
    }
}

impl From<ChatError> for PortError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::Database(db) => PortError::Unavailable(db.to_string()),
            other => PortError::Rejected(other.to_string()),
        }
    }
}

impl From<UserError> for PortError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound => PortError::Rejected(error.to_string()),
            other => PortError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl CredentialValidator for AuthService {
    async fn validate(&self, token: &str) -> Result<Identity, PortError> {
        let claims = AuthService::validate(self, token).await?;
        Ok(Identity {
            user_id: claims.sub,
            role: claims.role,
        })
    }

    async fn is_revoked(&self, token: &str) -> Result<bool, PortError> {
        Ok(AuthService::is_revoked(self, token).await?)
    }
}

#[async_trait]
impl MembershipOracle for ChatService {
    async fn is_member(&self, chat_id: &str, user_id: &str) -> Result<bool, PortError> {
        Ok(ChatService::is_member(self, chat_id, user_id).await?)
    }

    async fn list_members(&self, chat_id: &str) -> Result<Vec<Participant>, PortError> {
        Ok(self
            .members(chat_id)
            .await?
            .into_iter()
            .map(|member| Participant {
                user_id: member.user_id,
                display_name: member.login,
            })
            .collect())
    }
}

#[async_trait]
impl MessageStore for MessageService {
    async fn append(&self, chat_id: &str, user_id: &str, text: &str) -> Result<ChatMessage, PortError> {
        Ok(MessageService::append(self, chat_id, user_id, text).await?)
    }

    async fn recent_history(&self, chat_id: &str, limit: u32) -> Result<Vec<ChatMessage>, PortError> {
        Ok(MessageService::recent_history(self, chat_id, limit).await?)
    }
}

#[async_trait]
impl IdentityLookup for UserService {
    async fn display_name(&self, user_id: &str) -> Result<String, PortError> {
        Ok(UserService::display_name(self, user_id).await?)
    }
}
