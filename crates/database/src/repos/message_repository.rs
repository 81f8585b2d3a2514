//! Repository for chat messages.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::entities::ChatMessage;
use crate::types::{timestamp_now, DatabaseError, DatabaseResult};

const MESSAGE_SELECT: &str = r#"
    SELECT m.id, m.chat_id, m.user_id, u.login, m.message_text, m.sending_time, m.updated_at
    FROM messages m
    JOIN users u ON u.id = m.user_id
"#;

#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a message with a server-assigned id and send time.
    pub async fn create(&self, chat_id: &str, user_id: &str, text: &str) -> DatabaseResult<ChatMessage> {
        let id = Uuid::new_v4().to_string();
        let sending_time = timestamp_now();

        sqlx::query(
            "INSERT INTO messages (id, chat_id, user_id, message_text, sending_time)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(chat_id)
        .bind(user_id)
        .bind(text)
        .bind(&sending_time)
        .execute(&self.pool)
        .await?;

        debug!(message_id = %id, chat_id, user_id, "stored message");

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("message {id}")))
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<ChatMessage>> {
        let row = sqlx::query(&format!("{MESSAGE_SELECT} WHERE m.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_message).transpose()
    }

    /// The `limit` most recent messages of a chat, newest first.
    pub async fn recent_by_chat(&self, chat_id: &str, limit: u32) -> DatabaseResult<Vec<ChatMessage>> {
        let rows = sqlx::query(&format!(
            "{MESSAGE_SELECT} WHERE m.chat_id = ? ORDER BY m.sending_time DESC, m.rowid DESC LIMIT ?"
        ))
        .bind(chat_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_message).collect()
    }
}

fn map_message(row: &SqliteRow) -> DatabaseResult<ChatMessage> {
    Ok(ChatMessage {
        id: row.try_get("id")?,
        chat_id: row.try_get("chat_id")?,
        user_id: row.try_get("user_id")?,
        login: row.try_get("login")?,
        text: row.try_get("message_text")?,
        sending_time: row.try_get("sending_time")?,
        updated_at: row.try_get("updated_at")?,
    })
}
