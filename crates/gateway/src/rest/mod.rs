//! REST API endpoints for the gateway

pub mod auth;
pub mod chat;
pub mod health;
pub mod user;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::middleware::auth_middleware;
use crate::state::GatewayState;

/// Create all REST API routes
pub fn create_rest_routes(state: Arc<GatewayState>) -> Router<Arc<GatewayState>> {
    let public = Router::new()
        .route("/health", get(health::health_check))
        .route("/api/users", post(auth::register))
        .route("/api/auth", post(auth::login));

    let protected = Router::new()
        .route("/api/user", get(user::current_user))
        .route("/api/users/search", get(user::search_users))
        .route("/api/users/login", put(user::update_login))
        .route("/api/users/:user_id", delete(user::delete_user))
        .route("/api/logout", post(auth::logout))
        .route("/api/chats", post(chat::create_chat).get(chat::list_chats))
        .route("/api/chats/:chat_id", delete(chat::delete_chat))
        .route_layer(axum_middleware::from_fn_with_state(state, auth_middleware));

    public.merge(protected)
}
