//! Row types returned by the repositories

pub mod chat;
pub mod message;
pub mod token;
pub mod user;

pub use chat::{Chat, ChatMember, ChatSummary};
pub use message::ChatMessage;
pub use token::RevokedToken;
pub use user::{User, UserRole};
