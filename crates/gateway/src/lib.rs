//! # Parley Gateway Crate
//!
//! The HTTP and WebSocket surface of Parley. REST endpoints cover accounts and
//! chat management; the realtime module runs live chat sessions.
//!
//! ## Architecture
//!
//! - **REST**: account bootstrap, login/logout, profile, search and chats
//! - **Realtime**: per-chat WebSocket sessions, the connection registry and
//!   the ports they consume
//! - **State**: services shared by every handler
//! - **Middleware**: bearer authentication and request logging
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(config: parley_config::AppConfig) -> anyhow::Result<()> {
//! use parley_gateway::{create_router, GatewayState};
//!
//! let state = GatewayState::from_config(&config).await?;
//! let app = create_router(state, config.http.static_dir.as_deref());
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod middleware;
pub mod realtime;
pub mod rest;
pub mod state;

pub use error::{GatewayError, GatewayResult};
pub use middleware::{auth_middleware, AuthUser};
pub use realtime::{ConnectionRegistry, RealtimeSettings, RealtimeState};
pub use state::GatewayState;

use std::sync::Arc;

use axum::{http::Method, middleware as axum_middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Create the main application router with all routes
///
/// When `static_dir` is set, unmatched paths are served from that directory.
pub fn create_router(state: GatewayState, static_dir: Option<&str>) -> Router {
    let arc_state = Arc::new(state);
    let mut router = Router::new()
        .merge(rest::create_rest_routes(arc_state.clone()))
        .merge(realtime::create_realtime_routes())
        .with_state(arc_state);

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers(Any),
        )
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
