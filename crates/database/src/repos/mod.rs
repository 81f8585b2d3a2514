pub mod chat_repository;
pub mod message_repository;
pub mod token_repository;
pub mod user_repository;

pub use chat_repository::ChatRepository;
pub use message_repository::MessageRepository;
pub use token_repository::TokenRepository;
pub use user_repository::UserRepository;
