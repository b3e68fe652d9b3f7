/// JWT token generation and validation module
///
/// Tokens are signed using HS256 (HMAC-SHA256) and identify the user by ID.
/// The email and authority are carried as informational claims; the API
/// re-loads the user on every request, so a stale authority in an old token
/// grants nothing.
///
/// Secrets should be at least 32 bytes.
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::jwt::{create_token, validate_token, Claims};
/// use tasklist_shared::models::user::Authority;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let claims = Claims::new(user_id, "jhex@email.com", Authority::Admin);
/// let token = create_token(&claims, "your-secret-key-at-least-32-bytes")?;
///
/// let validated = validate_token(&token, "your-secret-key-at-least-32-bytes")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::Authority;

/// Value of the `iss` claim
pub const ISSUER: &str = "tasklist";

/// Default token lifetime
pub const DEFAULT_EXPIRATION_HOURS: i64 = 24;

/// Failure to sign or accept a token
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("token could not be signed: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token rejected: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),

    #[error("token has expired")]
    Expired,

    #[error("token was not issued by {}", ISSUER)]
    InvalidIssuer,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidIssuer => Self::InvalidIssuer,
            _ => Self::Invalid(err),
        }
    }
}

/// Token payload
///
/// `sub`, `iss`, `iat`, `exp` and `nbf` are the registered claims. `email` and
/// `authority` describe the user at issue time and are informational only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub email: String,
    pub authority: Authority,
}

impl Claims {
    /// Claims valid for [`DEFAULT_EXPIRATION_HOURS`]
    pub fn new(user_id: Uuid, email: impl Into<String>, authority: Authority) -> Self {
        let lifetime = Duration::hours(DEFAULT_EXPIRATION_HOURS);
        Self::with_expiration(user_id, email, authority, lifetime)
    }

    /// Claims valid for `expires_in` from now
    ///
    /// ```
    /// use tasklist_shared::auth::jwt::Claims;
    /// use tasklist_shared::models::user::Authority;
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(
    ///     Uuid::new_v4(),
    ///     "amelia@email.com",
    ///     Authority::User,
    ///     Duration::hours(1),
    /// );
    /// assert_eq!(claims.exp - claims.iat, 3600);
    /// ```
    pub fn with_expiration(
        user_id: Uuid,
        email: impl Into<String>,
        authority: Authority,
        expires_in: Duration,
    ) -> Self {
        let issued_at = Utc::now().timestamp();

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: issued_at,
            nbf: issued_at,
            exp: issued_at + expires_in.num_seconds(),
            email: email.into(),
            authority,
        }
    }
}

/// Signs `claims` with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(JwtError::Encode)
}

/// Checks signature, issuer, `exp` and `nbf`, then returns the claims
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_nbf = true;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn claims_for(email: &str, authority: Authority, lifetime: Duration) -> Claims {
        Claims::with_expiration(Uuid::new_v4(), email, authority, lifetime)
    }

    #[test]
    fn test_default_lifetime() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, "armando@email.com", Authority::User);

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn test_token_carries_claims() {
        let claims = claims_for("jhex@email.com", Authority::Admin, Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        let decoded = validate_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.email, "jhex@email.com");
        assert_eq!(decoded.authority, Authority::Admin);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let claims = claims_for("a@email.com", Authority::User, Duration::hours(1));
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, "another-secret-key-at-least-32-bytes"),
            Err(JwtError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let claims = claims_for("a@email.com", Authority::User, Duration::seconds(-3600));
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(validate_token(&token, SECRET), Err(JwtError::Expired)));
    }

    #[test]
    fn test_foreign_issuer_rejected() {
        let mut claims = claims_for("a@email.com", Authority::User, Duration::hours(1));
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(JwtError::InvalidIssuer)
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            validate_token("not.a.token", SECRET),
            Err(JwtError::Invalid(_))
        ));
    }
}
