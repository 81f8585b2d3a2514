//! User service for profile, search, rename and account removal.

use parley_database::{ChatRepository, DatabaseError, SqlitePool, User, UserRepository};
use tracing::info;

use crate::types::{ChatRef, UserError, UserProfile, UserResult};
use crate::utils::validate_login;

const SEARCH_LIMIT: u32 = 20;

/// Service for managing user operations
#[derive(Clone)]
pub struct UserService {
    users: UserRepository,
    chats: ChatRepository,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            chats: ChatRepository::new(pool),
        }
    }

    pub async fn get_user(&self, user_id: &str) -> UserResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// The account together with the chats it takes part in
    pub async fn profile(&self, user_id: &str) -> UserResult<UserProfile> {
        let user = self.get_user(user_id).await?;
        let chats = self
            .chats
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(ChatRef::from)
            .collect();

        Ok(UserProfile::new(user, chats))
    }

    /// Accounts whose login starts with `prefix`
    pub async fn search(&self, prefix: &str) -> UserResult<Vec<User>> {
        if prefix.is_empty() {
            return Err(UserError::ValidationFailed(
                "Login prefix is required".to_string(),
            ));
        }
        Ok(self.users.search_by_login(prefix, SEARCH_LIMIT).await?)
    }

    pub async fn update_login(&self, user_id: &str, new_login: &str) -> UserResult<()> {
        validate_login(new_login)?;

        if self.users.login_exists(new_login).await? {
            return Err(UserError::LoginAlreadyExists);
        }

        self.users
            .update_login(user_id, new_login)
            .await
            .map_err(|err| match err {
                DatabaseError::Duplicate(_) => UserError::LoginAlreadyExists,
                DatabaseError::NotFound(_) => UserError::UserNotFound,
                other => UserError::Database(other),
            })
    }

    pub async fn delete_user(&self, user_id: &str) -> UserResult<()> {
        if !self.users.delete(user_id).await? {
            return Err(UserError::UserNotFound);
        }
        info!(user_id, "account removed");
        Ok(())
    }

    /// The name other participants see for `user_id`
    pub async fn display_name(&self, user_id: &str) -> UserResult<String> {
        Ok(self.get_user(user_id).await?.login)
    }
}
