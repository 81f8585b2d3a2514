//! # Parley Users Crate
//!
//! Accounts, password hashing, bearer tokens and their revocation.
//!
//! ## Architecture
//!
//! - **Services**: [`AuthService`] for registration, login, logout and token
//!   validation; [`UserService`] for profiles, search, renames and removal
//! - **Types**: errors and response shapes
//! - **Utils**: JWT, Argon2 and input validation helpers

pub mod services;
pub mod types;
pub mod utils;

pub use parley_database::{SqlitePool, User, UserRole};

pub use services::{AuthService, UserService};
pub use types::{AuthError, AuthResult, ChatRef, UserError, UserProfile, UserResult};
pub use utils::{Claims, JwtManager};
