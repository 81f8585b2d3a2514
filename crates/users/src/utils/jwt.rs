//! JWT (JSON Web Token) utilities for authentication.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::types::AuthError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,  // Subject (user ID)
    pub role: String, // User role
    pub exp: u64,     // Expiration time
    pub iat: u64,     // Issued at
    pub jti: String,  // JWT ID
}

/// JWT token manager
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl JwtManager {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_duration: Duration::from_secs(24 * 60 * 60),
        }
    }

    /// Set custom token duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.token_duration = duration;
        self
    }

    pub fn token_duration(&self) -> Duration {
        self.token_duration
    }

    /// Generate a new signed token for `user_id`
    pub fn generate_token(&self, user_id: &str, role: &str) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::TokenCreationFailed("system time error".to_string()))?;

        let exp = now.saturating_add(self.token_duration);

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: exp.as_secs(),
            iat: now.as_secs(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|err| AuthError::TokenCreationFailed(err.to_string()))
    }

    /// Validate signature and expiry, returning the embedded claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|err| AuthError::InvalidToken(err.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_jwt_manager() -> JwtManager {
        JwtManager::new("test_secret_key_that_is_long_enough_for_hs256")
    }

    #[test]
    fn test_token_generation_and_validation() {
        let jwt_manager = create_test_jwt_manager();

        let token = jwt_manager.generate_token("user-123", "admin").unwrap();
        assert!(!token.is_empty());

        let claims = jwt_manager.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let jwt_manager = create_test_jwt_manager();

        let first = jwt_manager.generate_token("u", "user").unwrap();
        let second = jwt_manager.generate_token("u", "user").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_token() {
        let jwt_manager = create_test_jwt_manager();

        let result = jwt_manager.validate_token("invalid.jwt.token");
        assert!(matches!(result, Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtManager::new("first-secret");
        let verifier = JwtManager::new("second-secret");

        let token = issuer.generate_token("u", "user").unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt_manager = create_test_jwt_manager();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        let token = jwt_manager
            .encode(&Claims {
                sub: "u".into(),
                role: "user".into(),
                exp: now - 120,
                iat: now - 240,
                jti: "expired".into(),
            })
            .unwrap();

        assert!(matches!(
            jwt_manager.validate_token(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
