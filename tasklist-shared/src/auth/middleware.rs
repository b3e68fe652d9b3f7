/// Authentication middleware for Axum
///
/// Validates `Authorization: Bearer <token>` headers, re-loads the user the
/// token names, and stores the caller identity as an [`AuthContext`] in the
/// request extensions.
///
/// # Middleware Types
///
/// - [`jwt_auth_middleware`]: rejects the request with 401 unless a valid
///   token for an existing user is presented
/// - [`optional_jwt_auth_middleware`]: never rejects; adds the context only
///   when a valid token is presented (used by registration)
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use tasklist_shared::auth::middleware::{jwt_auth_middleware, AuthContext, AuthState};
/// use tasklist_shared::repository::InMemoryStore;
///
/// async fn whoami(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.email)
/// }
///
/// let auth = AuthState::new(Arc::new(InMemoryStore::new()), "your-jwt-secret-at-least-32-bytes");
/// let app: Router = Router::new()
///     .route("/whoami", get(whoami))
///     .layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));
/// ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::{Authority, User};
use crate::repository::UserRepository;

/// Caller identity added to request extensions
///
/// Built from the freshly loaded user record, not from the token claims, so
/// authority and email changes apply to tokens issued earlier.
///
/// Handlers can take it directly as an extractor:
///
/// ```
/// use tasklist_shared::auth::middleware::AuthContext;
///
/// async fn handler(auth: AuthContext) -> String {
///     format!("User: {}, admin: {}", auth.user_id, auth.is_admin())
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub authority: Authority,
}

impl AuthContext {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            authority: user.authority,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.authority.is_admin()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}

/// Error type for authentication middleware
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingCredentials,

    /// Invalid authorization header format
    InvalidFormat(String),

    /// Token validation failed
    InvalidToken(String),

    /// Token is valid but its user no longer exists
    UnknownUser,

    /// Lookup of the user failed
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "missing credentials".to_string())
            }
            AuthError::InvalidFormat(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::UnknownUser => (StatusCode::UNAUTHORIZED, "user no longer exists".to_string()),
            AuthError::DatabaseError(msg) => {
                error!(error = %msg, "Authentication lookup failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "errors": [message] }))).into_response()
    }
}

/// Shared state of the JWT layers
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserRepository>,
    pub secret: Arc<str>,
}

impl AuthState {
    pub fn new(users: Arc<dyn UserRepository>, secret: impl Into<Arc<str>>) -> Self {
        Self {
            users,
            secret: secret.into(),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AuthError::InvalidFormat("expected Bearer token".to_string()))
}

/// Validates the bearer token and loads the user it names
pub async fn authenticate(auth: &AuthState, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;

    let claims = validate_token(token, &auth.secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("invalid issuer".to_string()),
        _ => AuthError::InvalidToken("invalid token".to_string()),
    })?;

    let user = auth
        .users
        .find_by_id(claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    Ok(AuthContext::from_user(&user))
}

/// JWT authentication middleware
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - Authorization header is missing or not a Bearer token
/// - Token validation fails or the token has expired
/// - The user named by the token no longer exists
pub async fn jwt_auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = authenticate(&auth, req.headers()).await?;
    debug!(user_id = %context.user_id, authority = %context.authority, "Authenticated request");

    req.extensions_mut().insert(context);
    Ok(next.run(req).await)
}

/// Optional JWT authentication middleware
///
/// Anonymous requests and requests with unusable tokens pass through
/// without an [`AuthContext`].
pub async fn optional_jwt_auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    if req.headers().contains_key(header::AUTHORIZATION) {
        match authenticate(&auth, req.headers()).await {
            Ok(context) => {
                req.extensions_mut().insert(context);
            }
            Err(e) => debug!(error = ?e, "Ignoring unusable credentials"),
        }
    }

    next.run(req).await
}
