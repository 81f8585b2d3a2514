//! Shared types for the user management system.

pub mod errors;
pub mod responses;

pub use errors::{AuthError, AuthResult, UserError, UserResult};
pub use responses::{ChatRef, UserProfile};
