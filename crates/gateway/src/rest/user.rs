//! Profile, search, rename and account removal endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use parley_users::{User, UserProfile};
use serde::{Deserialize, Serialize};

use crate::error::{GatewayError, GatewayResult};
use crate::middleware::AuthUser;
use crate::state::GatewayState;

/// Path alias for the caller's own account.
const SELF_ALIAS: &str = "me";

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub login: String,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateLoginRequest {
    pub new_login: String,
}

/// `GET /api/user`
pub async fn current_user(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
) -> GatewayResult<Json<UserProfile>> {
    Ok(Json(state.user_service().profile(&user.user_id).await?))
}

/// `GET /api/users/search?login=prefix`
pub async fn search_users(
    State(state): State<Arc<GatewayState>>,
    Query(query): Query<SearchQuery>,
) -> GatewayResult<Json<Vec<UserSummary>>> {
    let users = state.user_service().search(&query.login).await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

/// `PUT /api/users/login`
pub async fn update_login(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<UpdateLoginRequest>,
) -> GatewayResult<StatusCode> {
    state
        .user_service()
        .update_login(&user.user_id, &body.new_login)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/users/{user_id}`: accounts can only remove themselves.
pub async fn delete_user(
    State(state): State<Arc<GatewayState>>,
    Extension(user): Extension<AuthUser>,
    Path(target): Path<String>,
) -> GatewayResult<StatusCode> {
    if target != SELF_ALIAS && target != user.user_id {
        return Err(GatewayError::AuthorizationFailed(
            "Cannot delete another user's account".to_string(),
        ));
    }

    state.user_service().delete_user(&user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
