/// Request authentication context
///
/// The API's JWT middleware validates the bearer token and inserts an
/// `AuthContext` into the request extensions. Handlers take the context
/// as an explicit parameter; tenant identity is never read from ambient
/// state, and every database query below the handler is scoped by
/// `auth.tenant_id`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Verified identity of the requester
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user id
    pub user_id: Uuid,

    /// Tenant all data access is scoped to
    pub tenant_id: Uuid,
}

impl AuthContext {
    /// Builds the context from validated token claims.
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
            tenant_id: claims.tenant_id,
        }
    }
}

/// Error type for the authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header on the request
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("{0}")]
    InvalidFormat(String),

    /// Token failed validation (bad signature, expired, wrong issuer)
    #[error("{0}")]
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Missing credentials").into_response()
            }
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg).into_response(),
        }
    }
}

/// Pulls the bearer token out of an Authorization header value.
pub fn extract_bearer(header_value: &str) -> Result<&str, AuthError> {
    header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_auth_context_from_claims() {
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), "a@b.pk");
        let context = AuthContext::from_claims(&claims);

        assert_eq!(context.user_id, claims.sub);
        assert_eq!(context.tenant_id, claims.tenant_id);
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
        assert!(extract_bearer("Basic dXNlcjpwYXNz").is_err());
    }

    #[test]
    fn test_auth_errors_all_answer_unauthorized() {
        // Credential failures never leak which part was wrong; a
        // malformed header gets the same 401 as a bad token.
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidFormat("bad".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthError::InvalidToken("expired".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
