//! Revoked bearer tokens.

use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::types::{timestamp_now, DatabaseResult};

#[derive(Clone)]
pub struct TokenRepository {
    pool: SqlitePool,
}

impl TokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record `token` as revoked. Revoking twice is a no-op.
    pub async fn revoke(&self, token: &str, user_id: Option<&str>) -> DatabaseResult<()> {
        sqlx::query(
            "INSERT OR IGNORE INTO revoked_tokens (id, token, user_id, revoked_at) VALUES (?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(token)
        .bind(user_id)
        .bind(timestamp_now())
        .execute(&self.pool)
        .await?;

        info!(user_id = ?user_id, "revoked token");
        Ok(())
    }

    pub async fn is_revoked(&self, token: &str) -> DatabaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM revoked_tokens WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    #[tokio::test]
    async fn revocation_is_idempotent() {
        let (pool, _dir) = test_pool().await;
        let repo = TokenRepository::new(pool);

        assert!(!repo.is_revoked("abc").await.unwrap());
        repo.revoke("abc", None).await.unwrap();
        repo.revoke("abc", None).await.unwrap();
        assert!(repo.is_revoked("abc").await.unwrap());
        assert!(!repo.is_revoked("abd").await.unwrap());
    }
}
