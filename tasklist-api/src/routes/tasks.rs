/// Task endpoints
///
/// # Endpoints
///
/// Administrator only:
///
/// - `GET    /api/v1/tasks` - All tasks with their owners
/// - `GET    /api/v1/tasks/:id` - One task with its owner
/// - `PUT    /api/v1/tasks/:id` - Replace a task
/// - `PATCH  /api/v1/tasks/:id` - Partially update a task
/// - `DELETE /api/v1/tasks/:id` - Delete a task
/// - `POST   /api/v1/tasks/user/:id` - Create a task for the user `:id`
///
/// Any authenticated user, scoped to the caller's own tasks:
///
/// - `GET    /api/v1/tasks/user` - List own tasks
/// - `POST   /api/v1/tasks/user` - Create a task
/// - `GET    /api/v1/tasks/user/:id` - Get an own task
/// - `PUT    /api/v1/tasks/user/:id` - Replace an own task
/// - `PATCH  /api/v1/tasks/user/:id` - Partially update an own task
/// - `DELETE /api/v1/tasks/user/:id` - Delete an own task
///
/// A task owned by someone else answers `404`, same as a missing one.

use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;

use tasklist_shared::auth::middleware::AuthContext;
use tasklist_shared::models::task::{NewTask, PatchTask, ReplaceTask};

use super::views::{views, OwnedTaskView, TaskView};
use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
};

pub async fn list_all(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<TaskView>>> {
    let tasks = state.tasks.list_all(&auth).await?;
    Ok(Json(views(tasks)))
}

pub async fn get(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(state.tasks.get(&auth, id).await?.into()))
}

/// Replace a task (all fields required)
///
/// ```text
/// PUT /api/v1/tasks/:id
///
/// { "title": "Do the dishes", "description": "", "taskStatus": "COMPLETED" }
/// ```
pub async fn replace(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReplaceTask>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(state.tasks.replace(&auth, id, input).await?.into()))
}

/// Partially update a task
///
/// ```text
/// PATCH /api/v1/tasks/:id
///
/// { "taskStatus": "IN_PROGRESS" }
/// ```
pub async fn patch(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<PatchTask>,
) -> ApiResult<Json<TaskView>> {
    Ok(Json(state.tasks.patch(&auth, id, input).await?.into()))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.tasks.delete(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_for_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(user_id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<NewTask>,
) -> ApiResult<(StatusCode, Json<TaskView>)> {
    let task = state.tasks.create_for_user(&auth, user_id, input).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

// Caller's own tasks

pub async fn list_own(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<OwnedTaskView>>> {
    let tasks = state.tasks.list_own(&auth).await?;
    Ok(Json(views(tasks)))
}

/// Create a task owned by the caller
///
/// ```text
/// POST /api/v1/tasks/user
///
/// { "title": "Go to the gym", "description": "At 17:30" }
/// ```
///
/// `taskStatus` is optional and defaults to `PENDING`.
pub async fn create_own(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiJson(input): ApiJson<NewTask>,
) -> ApiResult<(StatusCode, Json<OwnedTaskView>)> {
    let task = state.tasks.create_own(&auth, input).await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

pub async fn get_own(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<OwnedTaskView>> {
    Ok(Json(state.tasks.get_own(&auth, id).await?.into()))
}

pub async fn replace_own(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<ReplaceTask>,
) -> ApiResult<Json<OwnedTaskView>> {
    Ok(Json(state.tasks.replace_own(&auth, id, input).await?.into()))
}

pub async fn patch_own(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<PatchTask>,
) -> ApiResult<Json<OwnedTaskView>> {
    Ok(Json(state.tasks.patch_own(&auth, id, input).await?.into()))
}

pub async fn delete_own(
    State(state): State<AppState>,
    auth: AuthContext,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    state.tasks.delete_own(&auth, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
