//! Middleware for authentication and request logging

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::error::GatewayError;
use crate::state::GatewayState;

/// The caller of a protected route, inserted into request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub role: String,
    /// The bearer token as presented, needed for logout.
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Pull a bearer token from the `Authorization` header, falling back to `?token=`.
pub fn bearer_token(request: &Request) -> Option<String> {
    let header_token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string);

    header_token.or_else(|| {
        Query::<TokenQuery>::try_from_uri(request.uri())
            .ok()
            .and_then(|Query(query)| query.token)
            .filter(|token| !token.is_empty())
    })
}

/// Authentication middleware that validates bearer tokens
pub async fn auth_middleware(
    State(state): State<Arc<GatewayState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    let token = bearer_token(&request).ok_or_else(|| {
        GatewayError::AuthenticationFailed("Missing authentication token".to_string())
    })?;

    let claims = state.auth_service().validate(&token).await?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        role: claims.role,
        token,
    });

    Ok(next.run(request).await)
}

/// Logging middleware for request/response logging
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let start = std::time::Instant::now();
    let response = next.run(request).await;
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        path = %path,
        status = %response.status(),
        duration_ms = duration.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, authorization: Option<&str>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_bearer_token_sources() {
        assert_eq!(
            bearer_token(&request("/api/user", Some("Bearer abc"))),
            Some("abc".to_string())
        );
        assert_eq!(
            bearer_token(&request("/api/user?token=xyz", None)),
            Some("xyz".to_string())
        );
        assert_eq!(
            bearer_token(&request("/api/user?token=xyz", Some("Bearer abc"))),
            Some("abc".to_string())
        );
        assert_eq!(bearer_token(&request("/api/user", Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request("/api/user", Some("Bearer "))), None);
        assert_eq!(bearer_token(&request("/api/user", None)), None);
    }
}
