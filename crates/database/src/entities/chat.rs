//! Chat entity definitions

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A participant of a chat together with the login shown to the other side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMember {
    pub user_id: String,
    pub login: String,
}

/// A chat as seen from one of its participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: String,
    /// `None` once the other participant deleted their account.
    pub interlocutor_id: Option<String>,
    pub interlocutor_login: Option<String>,
    pub created_at: String,
}
