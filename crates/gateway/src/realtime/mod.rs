//! Live chat sessions over WebSocket.
//!
//! A session is bound to one chat for its whole life. It authenticates from a
//! `token` query parameter, checks membership, receives the other participant's
//! name and recent history, then exchanges JSON envelopes. Messages are
//! persisted before they are fanned out to every open session of the chat.

pub mod adapters;
pub mod connection;
pub mod handshake;
pub mod keepalive;
pub mod ports;
pub mod protocol;
pub mod pump;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use parley_config::RealtimeConfig;

use crate::state::GatewayState;

pub use connection::{Connection, ConnectionError, ConnectionId, SessionIdentity};
pub use handshake::{run_session, Rejection};
pub use ports::{
    Collaborators, CredentialValidator, Identity, IdentityLookup, MembershipOracle, MessageStore,
    Participant, PortError,
};
pub use protocol::{ClientEnvelope, DecodeError, ServerEnvelope};
pub use registry::{BroadcastReport, ConnectionRegistry};

/// Timing and size limits for live sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RealtimeSettings {
    pub pong_wait: Duration,
    pub write_wait: Duration,
    pub ping_period: Duration,
    pub max_message_size: usize,
    pub history_limit: u32,
}

impl From<&RealtimeConfig> for RealtimeSettings {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            pong_wait: config.pong_wait(),
            write_wait: config.write_wait(),
            ping_period: config.ping_period(),
            max_message_size: config.max_message_size,
            history_limit: config.history_limit,
        }
    }
}

/// Everything a session needs: the shared registry, the backing ports and limits.
#[derive(Clone)]
pub struct RealtimeState {
    pub registry: Arc<ConnectionRegistry>,
    pub collaborators: Collaborators,
    pub settings: RealtimeSettings,
}

impl RealtimeState {
    pub fn new(collaborators: Collaborators, settings: RealtimeSettings) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            collaborators,
            settings,
        }
    }
}

pub fn create_realtime_routes() -> Router<Arc<GatewayState>> {
    Router::new()
        .route("/ws", get(handshake::chat_socket))
        .route("/ws/", get(handshake::chat_socket))
        .route("/ws/:chat_id", get(handshake::chat_socket))
}
