/// Authorization helpers and ownership checks
///
/// # Permission Model
///
/// 1. **Authority**: administrators may use the by-ID operations on every
///    user and task; regular users get [`ServiceError::Forbidden`] there
/// 2. **Ownership**: self-scoped operations first resolve the caller to a
///    stored user, then only see records owned by that user
///
/// A task owned by someone else is reported exactly like a missing task, so
/// callers cannot discover the existence of foreign records.
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::auth::authorization::{require_admin, require_task_owner, resolve_caller};
/// use tasklist_shared::auth::middleware::AuthContext;
/// use tasklist_shared::error::ServiceResult;
/// use tasklist_shared::repository::{TaskRepository, UserRepository};
/// use uuid::Uuid;
///
/// async fn check(
///     users: &dyn UserRepository,
///     tasks: &dyn TaskRepository,
///     auth: &AuthContext,
///     task_id: Uuid,
/// ) -> ServiceResult<()> {
///     let caller = resolve_caller(users, auth).await?;
///     require_task_owner(tasks, task_id, caller.id).await?;
///     require_admin(auth)
/// }
/// ```

use tracing::debug;
use uuid::Uuid;

use super::middleware::AuthContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::User;
use crate::repository::{TaskRepository, UserRepository};

/// Fails with `Forbidden` unless the caller is an administrator
pub fn require_admin(auth: &AuthContext) -> ServiceResult<()> {
    if auth.is_admin() {
        Ok(())
    } else {
        debug!(user_id = %auth.user_id, "Rejected non-admin caller");
        Err(ServiceError::Forbidden)
    }
}

/// Loads the stored record of the caller
///
/// # Errors
///
/// `UserNotFound` if the caller's record has disappeared since the token
/// was checked
pub async fn resolve_caller(users: &dyn UserRepository, auth: &AuthContext) -> ServiceResult<User> {
    users
        .find_by_id(auth.user_id)
        .await?
        .ok_or(ServiceError::UserNotFound)
}

/// Fails with `TaskNotFound` unless `task_id` exists and belongs to `owner_id`
pub async fn require_task_owner(
    tasks: &dyn TaskRepository,
    task_id: Uuid,
    owner_id: Uuid,
) -> ServiceResult<()> {
    if tasks.exists_for_owner(task_id, owner_id).await? {
        Ok(())
    } else {
        debug!(%task_id, %owner_id, "Task not visible to caller");
        Err(ServiceError::TaskNotFound)
    }
}
