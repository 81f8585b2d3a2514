//! Input validation utilities.

use regex::Regex;

use crate::types::UserError;

const MAX_LOGIN_LEN: usize = 64;

/// Logins are shown to other users verbatim, so no whitespace or control characters.
pub fn validate_login(login: &str) -> Result<(), UserError> {
    if login.is_empty() {
        return Err(UserError::ValidationFailed("Login cannot be empty".to_string()));
    }

    if login.chars().count() > MAX_LOGIN_LEN {
        return Err(UserError::ValidationFailed(format!(
            "Login must be at most {MAX_LOGIN_LEN} characters long"
        )));
    }

    let login_regex = Regex::new(r"^[^\s\p{Cc}]+$")
        .map_err(|_| UserError::ValidationFailed("Invalid login regex".to_string()))?;

    if !login_regex.is_match(login) {
        return Err(UserError::ValidationFailed(
            "Login cannot contain whitespace or control characters".to_string(),
        ));
    }

    Ok(())
}
