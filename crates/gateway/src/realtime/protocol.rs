//! JSON envelopes exchanged over a chat socket.

use axum::extract::ws::Message;
use parley_chats::ChatMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Close code sent when the bearer credential is missing, invalid or revoked.
pub const CLOSE_AUTH_FAILED: u16 = 4001;
/// Close code sent when the upgrade path carried no chat id.
pub const CLOSE_CHAT_ID_MISSING: u16 = 4002;
/// Close code sent when the user is not a member of the requested chat.
pub const CLOSE_ACCESS_DENIED: u16 = 4003;

/// Frames pushed from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEnvelope {
    ChatInfo { name: String },
    History { messages: Vec<ChatMessage> },
    Message { message: ChatMessage },
    Error { message: String },
}

impl ServerEnvelope {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_frame(&self) -> Result<Message, serde_json::Error> {
        Ok(Message::Text(serde_json::to_string(self)?))
    }
}

/// Frames accepted from the client
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEnvelope {
    Message { text: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid message format")]
    Malformed,

    #[error("message type is required")]
    MissingType,

    #[error("unknown message type: {0}")]
    UnknownType(String),

    #[error("invalid message payload: {0}")]
    InvalidPayload(String),
}

impl ClientEnvelope {
    /// Parse a text or binary frame body.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let value: serde_json::Value =
            serde_json::from_slice(raw).map_err(|_| DecodeError::Malformed)?;

        let kind = match value.get("type") {
            Some(serde_json::Value::String(kind)) => kind.clone(),
            Some(_) | None => return Err(DecodeError::MissingType),
        };

        match kind.as_str() {
            "message" => serde_json::from_value(value)
                .map_err(|e| DecodeError::InvalidPayload(e.to_string())),
            _ => Err(DecodeError::UnknownType(kind)),
        }
    }
}
