//! User repository for database operations.

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;
use uuid::Uuid;

use crate::entities::{User, UserRole};
use crate::types::{timestamp_now, DatabaseError, DatabaseResult};

const USER_COLUMNS: &str = "id, login, password_hash, role, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new account. A taken login yields [`DatabaseError::Duplicate`].
    pub async fn create(
        &self,
        login: &str,
        password_hash: &str,
        role: UserRole,
    ) -> DatabaseResult<User> {
        let id = Uuid::new_v4().to_string();
        let now = timestamp_now();

        sqlx::query(
            "INSERT INTO users (id, login, password_hash, role, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(login)
        .bind(password_hash)
        .bind(role.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_write(e, "login"))?;

        info!(user_id = %id, login, role = %role, "created user");

        Ok(User {
            id,
            login: login.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    pub async fn find_by_login(&self, login: &str) -> DatabaseResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE login = ?"))
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(map_user).transpose()
    }

    pub async fn exists(&self, id: &str) -> DatabaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn login_exists(&self, login: &str) -> DatabaseResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE login = ?")
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Rename an account. Missing users yield `NotFound`, taken logins `Duplicate`.
    pub async fn update_login(&self, id: &str, new_login: &str) -> DatabaseResult<()> {
        let result = sqlx::query("UPDATE users SET login = ?, updated_at = ? WHERE id = ?")
            .bind(new_login)
            .bind(timestamp_now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::from_write(e, "login"))?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {id}")));
        }

        info!(user_id = %id, login = new_login, "updated user login");
        Ok(())
    }

    /// Delete an account and, through cascades, its memberships and messages.
    pub async fn delete(&self, id: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(user_id = %id, "deleted user");
        }
        Ok(deleted)
    }

    /// Users whose login starts with `prefix`, alphabetically.
    pub async fn search_by_login(&self, prefix: &str, limit: u32) -> DatabaseResult<Vec<User>> {
        let pattern = format!("{}%", escape_like(prefix));
        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE login LIKE ? ESCAPE '\\' ORDER BY login LIMIT ?"
        ))
        .bind(pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_user).collect()
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn map_user(row: &SqliteRow) -> DatabaseResult<User> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        login: row.try_get("login")?,
        password_hash: row.try_get("password_hash")?,
        role: UserRole::parse(&role)
            .ok_or_else(|| DatabaseError::CorruptRow(format!("unknown role {role}")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_pool;

    #[tokio::test]
    async fn create_and_find_user() {
        let (pool, _dir) = test_pool().await;
        let repo = UserRepository::new(pool);

        let created = repo.create("alice", "hash", UserRole::User).await.unwrap();
        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
        let by_login = repo.find_by_login("alice").await.unwrap().unwrap();

        assert_eq!(by_id, created);
        assert_eq!(by_login.id, created.id);
        assert!(repo.exists(&created.id).await.unwrap());
        assert!(repo.login_exists("alice").await.unwrap());
        assert!(!repo.login_exists("bob").await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_login_is_reported() {
        let (pool, _dir) = test_pool().await;
        let repo = UserRepository::new(pool);

        repo.create("alice", "hash", UserRole::User).await.unwrap();
        let err = repo.create("alice", "other", UserRole::Admin).await.unwrap_err();
        assert!(err.is_duplicate());
    }

    #[tokio::test]
    async fn update_login_checks_target() {
        let (pool, _dir) = test_pool().await;
        let repo = UserRepository::new(pool);

        let alice = repo.create("alice", "hash", UserRole::User).await.unwrap();
        repo.create("bob", "hash", UserRole::User).await.unwrap();

        assert!(repo.update_login(&alice.id, "bob").await.unwrap_err().is_duplicate());
        assert!(matches!(
            repo.update_login("missing", "carol").await,
            Err(DatabaseError::NotFound(_))
        ));

        repo.update_login(&alice.id, "alicia").await.unwrap();
        assert!(repo.find_by_login("alice").await.unwrap().is_none());
        assert_eq!(
            repo.find_by_login("alicia").await.unwrap().unwrap().id,
            alice.id
        );
    }

    #[tokio::test]
    async fn search_matches_prefix_only() {
        let (pool, _dir) = test_pool().await;
        let repo = UserRepository::new(pool);

        for login in ["anna", "andrew", "bob", "an_x"] {
            repo.create(login, "hash", UserRole::User).await.unwrap();
        }

        let logins: Vec<String> = repo
            .search_by_login("an", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.login)
            .collect();
        assert_eq!(logins, vec!["an_x", "andrew", "anna"]);

        let underscore: Vec<String> = repo
            .search_by_login("an_", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.login)
            .collect();
        assert_eq!(underscore, vec!["an_x"]);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let (pool, _dir) = test_pool().await;
        let repo = UserRepository::new(pool);

        let alice = repo.create("alice", "hash", UserRole::User).await.unwrap();
        assert!(repo.delete(&alice.id).await.unwrap());
        assert!(!repo.delete(&alice.id).await.unwrap());
        assert!(!repo.exists(&alice.id).await.unwrap());
    }
}
