/// Session token generation and validation
///
/// Tokens are HS256-signed JWTs carrying the authenticated user's id,
/// tenant id and email. Every tenant-scoped operation is keyed off the
/// `tenant_id` claim, so the token is the sole source of the request's
/// tenant context.
///
/// Expiry is fixed at 7 days with no refresh flow; clients log in again
/// when the token lapses.
///
/// # Example
///
/// ```
/// use taxbridge_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), "owner@acme.pk");
/// let token = create_token(&claims, "a-secret-of-at-least-32-bytes!!!")?;
///
/// let validated = validate_token(&token, "a-secret-of-at-least-32-bytes!!!")?;
/// assert_eq!(validated.tenant_id, claims.tenant_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Issuer claim on every token
const ISSUER: &str = "taxbridge";

/// Fixed session lifetime
const SESSION_DAYS: i64 = 7;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature, issuer or format problem
    #[error("Invalid token: {0}")]
    Invalid(String),
}

/// Claims carried by a session token
///
/// `sub` is the user id; `tenant_id` scopes every subsequent data access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - user id
    pub sub: Uuid,

    /// Tenant the user belongs to
    pub tenant_id: Uuid,

    /// User email (informational, shown in the dashboard header)
    pub email: String,

    /// Issuer - always "taxbridge"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims with the fixed 7-day expiry.
    pub fn new(user_id: Uuid, tenant_id: Uuid, email: impl Into<String>) -> Self {
        Self::with_expiry(user_id, tenant_id, email, Duration::days(SESSION_DAYS))
    }

    /// Creates claims with a custom expiry (used by tests to build
    /// already-expired tokens).
    pub fn with_expiry(
        user_id: Uuid,
        tenant_id: Uuid,
        email: impl Into<String>,
        expires_in: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            tenant_id,
            email: email.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + expires_in).timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Whether the token is past its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims into a token string.
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|e| JwtError::CreateError(e.to_string()))
}

/// Validates a token string and extracts its claims.
///
/// Checks the signature, expiry, not-before and issuer.
///
/// # Errors
///
/// `JwtError::Expired` for lapsed tokens, `JwtError::Invalid` for
/// anything else (bad signature, wrong issuer, malformed token).
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::Invalid(e.to_string()),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    #[test]
    fn test_claims_carry_identity() {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let claims = Claims::new(user_id, tenant_id, "owner@acme.pk");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.tenant_id, tenant_id);
        assert_eq!(claims.email, "owner@acme.pk");
        assert_eq!(claims.iss, "taxbridge");
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expiry_is_seven_days() {
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), "a@b.pk");
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 7 * 24 * 3600);
    }

    #[test]
    fn test_create_and_validate_roundtrip() {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();

        let claims = Claims::new(user_id, tenant_id, "owner@acme.pk");
        let token = create_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, user_id);
        assert_eq!(validated.tenant_id, tenant_id);
        assert_eq!(validated.email, "owner@acme.pk");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = Claims::new(Uuid::new_v4(), Uuid::new_v4(), "a@b.pk");
        let token = create_token(&claims, SECRET).unwrap();

        let result = validate_token(&token, "completely-different-secret-value");
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = Claims::with_expiry(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "a@b.pk",
            Duration::seconds(-3600),
        );
        assert!(claims.is_expired());

        let token = create_token(&claims, SECRET).unwrap();
        let result = validate_token(&token, SECRET);
        assert!(matches!(result, Err(JwtError::Expired)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_token("not-a-jwt", SECRET);
        assert!(matches!(result, Err(JwtError::Invalid(_))));
    }
}
