//! Chat REST endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use parley_chats::ChatSummary;
use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    /// Login of the other participant
    pub login: String,
}

#[derive(Debug, Serialize)]
pub struct CreateChatResponse {
    pub chat_id: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub id: String,
    /// The other participant's login; empty once they removed their account.
    pub name: String,
    pub interlocutor_id: Option<String>,
    pub created_at: String,
}

impl From<ChatSummary> for ChatResponse {
    fn from(summary: ChatSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.interlocutor_login.unwrap_or_default(),
            interlocutor_id: summary.interlocutor_id,
            created_at: summary.created_at,
        }
    }
}

/// `POST /api/chats`: returns the existing chat when the pair already has one.
pub async fn create_chat(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<CreateChatRequest>,
) -> GatewayResult<(StatusCode, Json<CreateChatResponse>)> {
    let chat = state
        .chat_service()
        .create_with_login(&user.user_id, &body.login)
        .await?;

    Ok((StatusCode::CREATED, Json(CreateChatResponse { chat_id: chat.id })))
}

/// `GET /api/chats`
pub async fn list_chats(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<Vec<ChatResponse>>> {
    let chats = state.chat_service().list_for_user(&user.user_id).await?;
    Ok(Json(chats.into_iter().map(ChatResponse::from).collect()))
}

/// `DELETE /api/chats/{chat_id}`: members only.
pub async fn delete_chat(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Path(chat_id): Path<String>,
) -> GatewayResult<StatusCode> {
    state.chat_service().delete(&chat_id, &user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
