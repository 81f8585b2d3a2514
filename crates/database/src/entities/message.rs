//! Message entity definitions

use serde::{Deserialize, Serialize};

/// A persisted chat message joined with its sender's login.
///
/// The serialized shape is the one pushed to live sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub chat_id: String,
    pub user_id: String,
    pub login: String,
    pub text: String,
    pub sending_time: String,
    pub updated_at: Option<String>,
}
