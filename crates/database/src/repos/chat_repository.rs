//! Repository for chat data access operations.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::entities::{Chat, ChatMember, ChatSummary};
use crate::types::{timestamp_now, DatabaseError, DatabaseResult};

/// Repository for chat database operations
#[derive(Clone)]
pub struct ChatRepository {
    pool: SqlitePool,
}

impl ChatRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a chat and enrol `user_ids` as its members in one transaction.
    pub async fn create_with_members(&self, user_ids: &[&str]) -> DatabaseResult<Chat> {
        let chat_id = Uuid::new_v4().to_string();
        let now = timestamp_now();

        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO chats (id, created_at, updated_at) VALUES (?, ?, ?)")
            .bind(&chat_id)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        for user_id in user_ids {
            sqlx::query(
                "INSERT INTO chat_users (id, chat_id, user_id, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&chat_id)
            .bind(*user_id)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::from_write(e, "chat member"))?;
        }

        tx.commit().await?;

        info!(chat_id = %chat_id, members = user_ids.len(), "created chat");

        Ok(Chat {
            id: chat_id,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn delete(&self, chat_id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM chats WHERE id = ?")
            .bind(chat_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(chat_id, "deleted chat");
        }
        Ok(deleted)
    }

    pub async fn find_by_id(&self, chat_id: &str) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query("SELECT id, created_at, updated_at FROM chats WHERE id = ?")
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_chat).transpose()
    }

    /// The chat whose members are exactly `user_a` and `user_b`, if any.
    pub async fn find_between(&self, user_a: &str, user_b: &str) -> DatabaseResult<Option<Chat>> {
        let row = sqlx::query(
            r#"
            SELECT c.id, c.created_at, c.updated_at
            FROM chats c
            JOIN chat_users a ON a.chat_id = c.id AND a.user_id = ?
            JOIN chat_users b ON b.chat_id = c.id AND b.user_id = ?
            WHERE (SELECT COUNT(*) FROM chat_users cu WHERE cu.chat_id = c.id) = 2
            ORDER BY c.created_at
            LIMIT 1
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_chat).transpose()
    }

    pub async fn is_member(&self, chat_id: &str, user_id: &str) -> DatabaseResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM chat_users WHERE chat_id = ? AND user_id = ?")
                .bind(chat_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    /// Members in the order they joined.
    pub async fn members(&self, chat_id: &str) -> DatabaseResult<Vec<ChatMember>> {
        let rows = sqlx::query(
            r#"
            SELECT cu.user_id, u.login
            FROM chat_users cu
            JOIN users u ON u.id = cu.user_id
            WHERE cu.chat_id = ?
            ORDER BY cu.created_at, cu.rowid
            "#,
        )
        .bind(chat_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ChatMember {
                    user_id: row.try_get("user_id")?,
                    login: row.try_get("login")?,
                })
            })
            .collect()
    }

    /// Chats `user_id` takes part in, each with the other participant, newest first.
    pub async fn list_for_user(&self, user_id: &str) -> DatabaseResult<Vec<ChatSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.created_at,
                   (SELECT o.user_id FROM chat_users o
                     WHERE o.chat_id = c.id AND o.user_id != mine.user_id
                     ORDER BY o.created_at, o.rowid LIMIT 1) AS interlocutor_id,
                   (SELECT u.login FROM chat_users o JOIN users u ON u.id = o.user_id
                     WHERE o.chat_id = c.id AND o.user_id != mine.user_id
                     ORDER BY o.created_at, o.rowid LIMIT 1) AS interlocutor_login
            FROM chats c
            JOIN chat_users mine ON mine.chat_id = c.id
            WHERE mine.user_id = ?
            ORDER BY c.created_at DESC, c.rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(ChatSummary {
                    id: row.try_get("id")?,
                    interlocutor_id: row.try_get("interlocutor_id")?,
                    interlocutor_login: row.try_get("interlocutor_login")?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }
}

fn map_chat(row: &SqliteRow) -> DatabaseResult<Chat> {
    Ok(Chat {
        id: row.try_get("id")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
