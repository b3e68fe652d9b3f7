/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration
/// - Login
///
/// # Endpoints
///
/// - `POST /api/v1/auth/register` - Register new user
/// - `POST /api/v1/auth/login` - Login and get a token

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use tasklist_shared::auth::middleware::AuthContext;
use tasklist_shared::models::user::{LoginUser, NewUser, User};

use crate::{app::AppState, error::ApiResult, extract::ApiJson};

/// Token response, returned by both registration and login
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// User ID
    pub user_id: Uuid,

    /// Access token
    pub access_token: String,

    /// Always `Bearer`
    pub token_type: String,
}

impl TokenResponse {
    fn issue(state: &AppState, user: &User) -> ApiResult<Self> {
        Ok(Self {
            user_id: user.id,
            access_token: state.issue_token(user)?,
            token_type: "Bearer".to_string(),
        })
    }
}

/// Register a new user
///
/// Anyone may register. When the request carries a valid administrator
/// token, the `authority` field is honored; otherwise the user gets `USER`.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/register
/// Content-Type: application/json
///
/// {
///   "username": "amelia_1990",
///   "email": "amelia@email.com",
///   "password": "longerPassword544"
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "user_id": "uuid",
///   "access_token": "eyJ...",
///   "token_type": "Bearer"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or the email is already taken
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    creator: Option<AuthContext>,
    ApiJson(req): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<TokenResponse>)> {
    let user = state.users.register(creator.as_ref(), req).await?;
    let response = TokenResponse::issue(&state, &user)?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "amelia@email.com",
///   "password": "longerPassword544"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Email or password missing
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginUser>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state.users.authenticate(req).await?;
    info!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse::issue(&state, &user)?))
}
