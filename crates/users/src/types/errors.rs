//! Error types for the user management system.

use parley_database::DatabaseError;
use thiserror::Error;

/// Account-level errors
#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("Login already exists")]
    LoginAlreadyExists,

    #[error("Login and password must not be empty")]
    EmptyCredentials,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid user role: {0}")]
    InvalidUserRole(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Password hashing failed")]
    PasswordHashingFailed,

    #[error("Invalid password hash")]
    InvalidPasswordHash,

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Token-level errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Token creation failed: {0}")]
    TokenCreationFailed(String),

    #[error(transparent)]
    User(#[from] UserError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Result types for user operations
pub type UserResult<T> = Result<T, UserError>;
pub type AuthResult<T> = Result<T, AuthError>;
