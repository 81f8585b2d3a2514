//! # Parley Chats Crate
//!
//! Business logic for two-party chats: opening and deleting chats, membership
//! queries, and message persistence with bounded history.
//!
//! ## Usage
//!
//! ```rust,no_run
//! # async fn demo(pool: parley_database::SqlitePool) -> Result<(), parley_chats::ChatError> {
//! use parley_chats::{ChatService, MessageService};
//!
//! let chats = ChatService::new(pool.clone());
//! let messages = MessageService::new(pool);
//!
//! let chat = chats.create_with_login("alice-id", "bob").await?;
//! messages.append(&chat.id, "alice-id", "hi").await?;
//! let history = messages.recent_history(&chat.id, 50).await?;
//! # let _ = history;
//! # Ok(())
//! # }
//! ```

pub mod services;
pub mod types;

pub use parley_database::{Chat, ChatMember, ChatMessage, ChatSummary};
pub use services::{ChatService, MessageService};
pub use types::{ChatError, ChatResult};
