//! Authentication service: account bootstrap, credential checks and bearer tokens.

use std::time::Duration;

use parley_database::{DatabaseError, SqlitePool, TokenRepository, User, UserRepository, UserRole};
use tracing::{info, warn};

use crate::types::{AuthError, AuthResult, UserError};
use crate::utils::{hash_password, validate_login, verify_password, Claims, JwtManager};

/// Service for managing authentication operations
pub struct AuthService {
    users: UserRepository,
    tokens: TokenRepository,
    jwt: JwtManager,
}

impl AuthService {
    pub fn new(pool: SqlitePool, secret: &str, token_ttl: Duration) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            tokens: TokenRepository::new(pool),
            jwt: JwtManager::new(secret).with_duration(token_ttl),
        }
    }

    /// Create the account when `login` is new, otherwise check the password of the
    /// existing one. Either way the account is returned.
    pub async fn register_or_login(
        &self,
        login: &str,
        password: &str,
        role: Option<&str>,
    ) -> AuthResult<User> {
        if login.trim().is_empty() || password.is_empty() {
            return Err(UserError::EmptyCredentials.into());
        }

        if let Some(existing) = self.users.find_by_login(login).await? {
            if !verify_password(password, &existing.password_hash)? {
                warn!(login, "password mismatch for existing account");
                return Err(UserError::InvalidCredentials.into());
            }
            return Ok(existing);
        }

        let role = match role {
            None | Some("") => UserRole::User,
            Some(value) => UserRole::parse(value)
                .ok_or_else(|| UserError::InvalidUserRole(value.to_string()))?,
        };
        validate_login(login)?;

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(login, &password_hash, role)
            .await
            .map_err(|err| match err {
                DatabaseError::Duplicate(_) => UserError::LoginAlreadyExists,
                other => UserError::Database(other),
            })?;

        info!(user_id = %user.id, login, "registered account");
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, login: &str, password: &str) -> AuthResult<String> {
        if login.is_empty() || password.is_empty() {
            return Err(UserError::EmptyCredentials.into());
        }

        let user = self
            .users
            .find_by_login(login)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials.into());
        }

        let token = self.jwt.generate_token(&user.id, user.role.as_str())?;
        info!(user_id = %user.id, "issued token");
        Ok(token)
    }

    /// Revoke a token so later validation rejects it even before it expires
    pub async fn logout(&self, token: &str) -> AuthResult<()> {
        let claims = self.jwt.validate_token(token)?;
        self.tokens.revoke(token, Some(&claims.sub)).await?;
        info!(user_id = %claims.sub, "logged out");
        Ok(())
    }

    pub async fn is_revoked(&self, token: &str) -> AuthResult<bool> {
        Ok(self.tokens.is_revoked(token).await?)
    }

    /// Revocation is checked before the signature so revoked tokens always report as such
    pub async fn validate(&self, token: &str) -> AuthResult<Claims> {
        if self.is_revoked(token).await? {
            return Err(AuthError::TokenRevoked);
        }
        self.jwt.validate_token(token)
    }
}
