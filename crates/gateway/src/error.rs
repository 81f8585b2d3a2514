//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use parley_chats::ChatError;
use parley_database::DatabaseError;
use parley_users::{AuthError, UserError};
use serde_json::json;
use thiserror::Error;

/// Gateway error types
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Authorization failed: {0}")]
    AuthorizationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            GatewayError::AuthorizationFailed(_) => StatusCode::FORBIDDEN,
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Conflict(_) => StatusCode::CONFLICT,
            GatewayError::InternalError(_) | GatewayError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let error_response = json!({
            "error": status.as_str(),
            "message": self.to_string(),
        });

        (status, Json(error_response)).into_response()
    }
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

impl From<DatabaseError> for GatewayError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::NotFound(what) => GatewayError::NotFound(what),
            DatabaseError::Duplicate(what) => GatewayError::Conflict(what),
            other => GatewayError::DatabaseError(other.to_string()),
        }
    }
}

impl From<UserError> for GatewayError {
    fn from(error: UserError) -> Self {
        match error {
            UserError::UserNotFound => GatewayError::NotFound("User not found".to_string()),
            UserError::LoginAlreadyExists => GatewayError::Conflict("Login already exists".to_string()),
            UserError::InvalidCredentials => {
                GatewayError::AuthenticationFailed("Invalid credentials".to_string())
            }
            UserError::EmptyCredentials
            | UserError::InvalidUserRole(_)
            | UserError::ValidationFailed(_) => GatewayError::InvalidRequest(error.to_string()),
            UserError::PasswordHashingFailed | UserError::InvalidPasswordHash => {
                GatewayError::InternalError(error.to_string())
            }
            UserError::Database(db) => db.into(),
        }
    }
}

impl From<AuthError> for GatewayError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidToken(_) | AuthError::TokenRevoked => {
                GatewayError::AuthenticationFailed(error.to_string())
            }
            AuthError::TokenCreationFailed(msg) => GatewayError::InternalError(msg),
            AuthError::User(user) => user.into(),
            AuthError::Database(db) => db.into(),
        }
    }
}

impl From<ChatError> for GatewayError {
    fn from(error: ChatError) -> Self {
        match error {
            ChatError::ChatNotFound { .. } | ChatError::UserNotFound { .. } => {
                GatewayError::NotFound(error.to_string())
            }
            ChatError::NotAMember => GatewayError::AuthorizationFailed(error.to_string()),
            ChatError::SelfChat | ChatError::EmptyMessage => {
                GatewayError::InvalidRequest(error.to_string())
            }
            ChatError::Database(db) => db.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let cases = [
            (GatewayError::from(UserError::LoginAlreadyExists), StatusCode::CONFLICT),
            (GatewayError::from(UserError::InvalidCredentials), StatusCode::UNAUTHORIZED),
            (GatewayError::from(UserError::EmptyCredentials), StatusCode::BAD_REQUEST),
            (GatewayError::from(UserError::UserNotFound), StatusCode::NOT_FOUND),
            (GatewayError::from(AuthError::TokenRevoked), StatusCode::UNAUTHORIZED),
            (
                GatewayError::from(AuthError::User(UserError::InvalidCredentials)),
                StatusCode::UNAUTHORIZED,
            ),
            (GatewayError::from(ChatError::NotAMember), StatusCode::FORBIDDEN),
            (GatewayError::from(ChatError::SelfChat), StatusCode::BAD_REQUEST),
            (GatewayError::from(ChatError::chat_not_found("c1")), StatusCode::NOT_FOUND),
            (
                GatewayError::from(DatabaseError::ConnectionError("down".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "{error}");
        }
    }

    #[test]
    fn response_body_carries_error_and_message() {
        let response = GatewayError::NotFound("Chat not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
