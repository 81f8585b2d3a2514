//! Internal utilities for the user management system.

pub mod jwt;
pub mod password;
pub mod validation;

pub use jwt::*;
pub use password::*;
pub use validation::*;
