//! Parley Database Crate
//!
//! Connection management, embedded migrations, row types and repositories for
//! accounts, two-party chats, messages and revoked tokens.

use parley_config::DatabaseConfig;

pub mod connection;
pub mod entities;
pub mod migrations;
pub mod repos;
pub mod types;

pub use connection::prepare_database;
pub use migrations::run_migrations;

pub use repos::{ChatRepository, MessageRepository, TokenRepository, UserRepository};

pub use entities::{Chat, ChatMember, ChatMessage, ChatSummary, RevokedToken, User, UserRole};

pub use types::{errors::DatabaseError, timestamp_now, DatabaseResult};

pub use sqlx::SqlitePool;

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::ConnectionError(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::MigrationError(format!("{e:#}")))?;

    Ok(pool)
}
