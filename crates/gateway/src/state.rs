//! Shared application state for the gateway

use std::sync::Arc;

use parley_chats::{ChatService, MessageService};
use parley_config::AppConfig;
use parley_database::SqlitePool;
use parley_users::{AuthService, UserService};

use crate::error::{GatewayError, GatewayResult};
use crate::realtime::{Collaborators, RealtimeSettings, RealtimeState};

/// Shared application state containing all services
#[derive(Clone)]
pub struct GatewayState {
    /// Database connection pool
    pub pool: SqlitePool,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub chat_service: Arc<ChatService>,
    pub message_service: Arc<MessageService>,
    /// Live sessions and the ports they run against
    pub realtime: RealtimeState,
}

impl GatewayState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        let auth_service = Arc::new(AuthService::new(
            pool.clone(),
            &config.auth.jwt_secret,
            config.auth.token_ttl(),
        ));
        let user_service = Arc::new(UserService::new(pool.clone()));
        let chat_service = Arc::new(ChatService::new(pool.clone()));
        let message_service = Arc::new(MessageService::new(pool.clone()));

        let collaborators = Collaborators {
            credentials: auth_service.clone(),
            membership: chat_service.clone(),
            store: message_service.clone(),
            identities: user_service.clone(),
        };
        let realtime = RealtimeState::new(collaborators, RealtimeSettings::from(&config.realtime));

        Self {
            pool,
            auth_service,
            user_service,
            chat_service,
            message_service,
            realtime,
        }
    }

    /// Open the configured database, run migrations and build the state
    pub async fn from_config(config: &AppConfig) -> GatewayResult<Self> {
        let pool = parley_database::initialize_database(&config.database)
            .await
            .map_err(|e| GatewayError::DatabaseError(format!("Failed to initialize database: {}", e)))?;

        Ok(Self::new(pool, config))
    }

    pub fn auth_service(&self) -> &AuthService {
        &self.auth_service
    }

    pub fn user_service(&self) -> &UserService {
        &self.user_service
    }

    pub fn chat_service(&self) -> &ChatService {
        &self.chat_service
    }

    pub fn message_service(&self) -> &MessageService {
        &self.message_service
    }

    pub fn realtime(&self) -> &RealtimeState {
        &self.realtime
    }
}
