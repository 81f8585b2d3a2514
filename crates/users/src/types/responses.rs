//! Response shapes produced by the user services.

use parley_database::{ChatSummary, User, UserRole};
use serde::{Deserialize, Serialize};

/// A chat as listed on a profile: its id and the other participant's login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRef {
    pub id: String,
    pub name: String,
}

impl From<ChatSummary> for ChatRef {
    fn from(summary: ChatSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.interlocutor_login.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub login: String,
    pub role: UserRole,
    pub created_at: String,
    pub chats: Vec<ChatRef>,
}

impl UserProfile {
    pub fn new(user: User, chats: Vec<ChatRef>) -> Self {
        Self {
            id: user.id,
            login: user.login,
            role: user.role,
            created_at: user.created_at,
            chats,
        }
    }
}
