/// User endpoints
///
/// # Endpoints
///
/// Administrator only (privileged: may change `authority`):
///
/// - `GET    /api/v1/users` - All users with authority and tasks
/// - `GET    /api/v1/users/:id` - One user with authority and tasks
/// - `PUT    /api/v1/users/:id` - Replace a user
/// - `PATCH  /api/v1/users/:id` - Partially update a user
/// - `DELETE /api/v1/users/:id` - Delete a user and its tasks
///
/// Any authenticated user, acting on itself (never privileged, even for
/// administrators):
///
/// - `GET    /api/v1/users/self`
/// - `PUT    /api/v1/users/self`
/// - `PATCH  /api/v1/users/self`
/// - `DELETE /api/v1/users/self`

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use tasklist_shared::auth::middleware::AuthContext;
use tasklist_shared::models::user::{PatchUser, ReplaceUser};

use super::views::{views, ExtendedUserView, UserView};
use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
};

pub async fn list_all(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<ExtendedUserView>>> {
    let users = state.users.list_all(&auth).await?;
    Ok(Json(views(users)))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<ExtendedUserView>> {
    Ok(Json(state.users.get(&auth, id).await?.into()))
}

/// Replace a user
///
/// ```text
/// PUT /api/v1/users/:id
///
/// {
///   "username": "amelia_1990",
///   "email": "amelia@email.com",
///   "password": "anotherPassword1",
///   "authority": "ADMIN"
/// }
/// ```
///
/// The new password must differ from the current one.
pub async fn replace(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReplaceUser>,
) -> ApiResult<Json<UserView>> {
    Ok(Json(state.users.replace(&auth, id, input).await?.into()))
}

/// Partially update a user
///
/// Every failing field is reported; nothing is written unless all pass.
pub async fn patch(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<PatchUser>,
) -> ApiResult<Json<ExtendedUserView>> {
    Ok(Json(state.users.patch(&auth, id, input).await?.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.users.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// The caller's own account

pub async fn get_self(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<UserView>> {
    Ok(Json(state.users.get_self(&auth).await?.into()))
}

pub async fn replace_self(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<ReplaceUser>,
) -> ApiResult<Json<UserView>> {
    Ok(Json(state.users.replace_self(&auth, input).await?.into()))
}

pub async fn patch_self(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<PatchUser>,
) -> ApiResult<Json<UserView>> {
    Ok(Json(state.users.patch_self(&auth, input).await?.into()))
}

pub async fn delete_self(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<StatusCode> {
    state.users.delete_self(&auth).await?;
    Ok(StatusCode::NO_CONTENT)
}
