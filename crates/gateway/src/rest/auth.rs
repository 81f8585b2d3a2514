//! Account bootstrap, login and logout endpoints

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::GatewayResult;
use crate::middleware::AuthUser;
use crate::state::GatewayState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// `POST /api/users`: create the account, or confirm the password of an existing one.
pub async fn register(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<RegisterRequest>,
) -> GatewayResult<Json<RegisterResponse>> {
    let user = state
        .auth_service()
        .register_or_login(&body.login, &body.password, body.role.as_deref())
        .await?;

    Ok(Json(RegisterResponse { user_id: user.id }))
}

/// `POST /api/auth`
pub async fn login(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<LoginRequest>,
) -> GatewayResult<Json<TokenResponse>> {
    let token = state.auth_service().login(&body.login, &body.password).await?;
    Ok(Json(TokenResponse { token }))
}

/// `POST /api/logout`: revoke the token used for this request.
pub async fn logout(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<StatusCode> {
    state.auth_service().logout(&user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}
