/// Task operations and merge rules
///
/// # Full replace (PUT)
///
/// `title`, `description` and `taskStatus` are all required. Title and
/// description may not both be blank. On success all three are overwritten.
///
/// # Partial update (PATCH)
///
/// Any subset of the fields may be supplied; at least one must be. A field
/// sent as `null` counts as not supplied. The not-both-blank rule only runs when title AND description are supplied in
/// the same request, so a status-only patch succeeds even on a task whose
/// title and description are both blank.
///
/// # Atomicity
///
/// Merges run on a copy of the stored task, which is persisted only after
/// every check has passed.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::auth::authorization::{require_admin, require_task_owner, resolve_caller};
use crate::auth::middleware::AuthContext;
use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{CreateTask, NewTask, PatchTask, ReplaceTask, Task};
use crate::models::user::User;
use crate::repository::{TaskRepository, UserRepository};
use crate::validation::is_blank;

const MISSING_TEXT: &str = "title and description must be provided";
const MISSING_STATUS: &str = "task status must be provided";
const BLANK_TEXT: &str = "either title or description must have text";
const EMPTY_PATCH: &str = "at least one field of the task must be provided";

/// A task together with its owner, for administrator views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskWithOwner {
    pub task: Task,
    pub owner: User,
}

fn ensure_has_text(title: &str, description: &str) -> ServiceResult<()> {
    if is_blank(title) && is_blank(description) {
        Err(ServiceError::invalid_task(BLANK_TEXT))
    } else {
        Ok(())
    }
}

/// Applies a full replacement to `task`
///
/// `task` is left untouched on failure.
pub fn apply_replace(task: &mut Task, input: &ReplaceTask) -> ServiceResult<()> {
    let (Some(title), Some(description)) = (&input.title, &input.description) else {
        return Err(ServiceError::invalid_task(MISSING_TEXT));
    };
    let Some(status) = input.task_status else {
        return Err(ServiceError::invalid_task(MISSING_STATUS));
    };
    ensure_has_text(title, description)?;

    task.title = title.clone();
    task.description = description.clone();
    task.task_status = status;
    Ok(())
}

/// Applies a partial update to `task`
///
/// `task` is left untouched on failure.
pub fn apply_patch(task: &mut Task, input: &PatchTask) -> ServiceResult<()> {
    if input.is_empty() {
        return Err(ServiceError::invalid_task(EMPTY_PATCH));
    }
    let (title, description) = (input.title.as_value(), input.description.as_value());
    if let (Some(title), Some(description)) = (title, description) {
        ensure_has_text(title, description)?;
    }

    if let Some(title) = title {
        task.title = title.clone();
    }
    if let Some(description) = description {
        task.description = description.clone();
    }
    if let Some(&status) = input.task_status.as_value() {
        task.task_status = status;
    }
    Ok(())
}

/// Validates creation input into a row for `owner_id`
pub fn prepare_create(owner_id: Uuid, input: NewTask) -> ServiceResult<CreateTask> {
    let (Some(title), Some(description)) = (input.title, input.description) else {
        return Err(ServiceError::invalid_task(MISSING_TEXT));
    };
    ensure_has_text(&title, &description)?;

    Ok(CreateTask {
        owner_id,
        title,
        description,
        task_status: input.task_status.unwrap_or_default(),
    })
}

/// Task use cases, for administrators and for task owners
#[derive(Clone)]
pub struct TaskService {
    users: Arc<dyn UserRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(users: Arc<dyn UserRepository>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { users, tasks }
    }

    async fn load(&self, id: Uuid) -> ServiceResult<Task> {
        self.tasks
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::TaskNotFound)
    }

    async fn with_owner(&self, task: Task) -> ServiceResult<TaskWithOwner> {
        let owner = self
            .users
            .find_by_id(task.owner_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;
        Ok(TaskWithOwner { task, owner })
    }

    async fn store(&self, task: &Task) -> ServiceResult<Task> {
        self.tasks
            .update(task)
            .await?
            .ok_or(ServiceError::TaskNotFound)
    }

    async fn load_owned(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<Task> {
        let caller = resolve_caller(self.users.as_ref(), auth).await?;
        require_task_owner(self.tasks.as_ref(), id, caller.id).await?;
        self.load(id).await
    }

    // Administrator operations

    /// Every task with its owner, oldest first
    pub async fn list_all(&self, auth: &AuthContext) -> ServiceResult<Vec<TaskWithOwner>> {
        require_admin(auth)?;

        let owners: HashMap<Uuid, User> = self
            .users
            .find_all()
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect();

        let tasks = self.tasks.find_all().await?;
        Ok(tasks
            .into_iter()
            .filter_map(|task| {
                let owner = owners.get(&task.owner_id)?.clone();
                Some(TaskWithOwner { task, owner })
            })
            .collect())
    }

    pub async fn get(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<TaskWithOwner> {
        require_admin(auth)?;
        let task = self.load(id).await?;
        self.with_owner(task).await
    }

    /// Creates a task for any user
    pub async fn create_for_user(
        &self,
        auth: &AuthContext,
        user_id: Uuid,
        input: NewTask,
    ) -> ServiceResult<TaskWithOwner> {
        require_admin(auth)?;
        let owner = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)?;

        let task = self.tasks.insert(prepare_create(owner.id, input)?).await?;
        info!(task_id = %task.id, owner_id = %owner.id, by = %auth.user_id, "Task created for user");
        Ok(TaskWithOwner { task, owner })
    }

    pub async fn replace(
        &self,
        auth: &AuthContext,
        id: Uuid,
        input: ReplaceTask,
    ) -> ServiceResult<TaskWithOwner> {
        require_admin(auth)?;
        let mut task = self.load(id).await?;
        apply_replace(&mut task, &input)?;

        let task = self.store(&task).await?;
        info!(task_id = %task.id, by = %auth.user_id, "Task replaced");
        self.with_owner(task).await
    }

    pub async fn patch(
        &self,
        auth: &AuthContext,
        id: Uuid,
        input: PatchTask,
    ) -> ServiceResult<TaskWithOwner> {
        require_admin(auth)?;
        let mut task = self.load(id).await?;
        apply_patch(&mut task, &input)?;

        let task = self.store(&task).await?;
        info!(task_id = %task.id, by = %auth.user_id, "Task patched");
        self.with_owner(task).await
    }

    pub async fn delete(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<()> {
        require_admin(auth)?;
        if !self.tasks.delete(id).await? {
            return Err(ServiceError::TaskNotFound);
        }
        info!(task_id = %id, by = %auth.user_id, "Task deleted");
        Ok(())
    }

    // Operations scoped to the caller's own tasks

    /// The caller's tasks, oldest first
    pub async fn list_own(&self, auth: &AuthContext) -> ServiceResult<Vec<Task>> {
        let caller = resolve_caller(self.users.as_ref(), auth).await?;
        Ok(self.tasks.find_by_owner(caller.id).await?)
    }

    pub async fn get_own(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<Task> {
        self.load_owned(auth, id).await
    }

    pub async fn create_own(&self, auth: &AuthContext, input: NewTask) -> ServiceResult<Task> {
        let caller = resolve_caller(self.users.as_ref(), auth).await?;

        let task = self.tasks.insert(prepare_create(caller.id, input)?).await?;
        info!(task_id = %task.id, owner_id = %caller.id, "Task created");
        Ok(task)
    }

    pub async fn replace_own(
        &self,
        auth: &AuthContext,
        id: Uuid,
        input: ReplaceTask,
    ) -> ServiceResult<Task> {
        let mut task = self.load_owned(auth, id).await?;
        apply_replace(&mut task, &input)?;

        let task = self.store(&task).await?;
        info!(task_id = %task.id, owner_id = %task.owner_id, "Own task replaced");
        Ok(task)
    }

    pub async fn patch_own(
        &self,
        auth: &AuthContext,
        id: Uuid,
        input: PatchTask,
    ) -> ServiceResult<Task> {
        let mut task = self.load_owned(auth, id).await?;
        apply_patch(&mut task, &input)?;

        let task = self.store(&task).await?;
        info!(task_id = %task.id, owner_id = %task.owner_id, "Own task patched");
        Ok(task)
    }

    pub async fn delete_own(&self, auth: &AuthContext, id: Uuid) -> ServiceResult<()> {
        let caller = resolve_caller(self.users.as_ref(), auth).await?;
        require_task_owner(self.tasks.as_ref(), id, caller.id).await?;

        if !self.tasks.delete(id).await? {
            return Err(ServiceError::TaskNotFound);
        }
        info!(task_id = %id, owner_id = %caller.id, "Own task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::patch::Patch;
    use crate::models::task::TaskStatus;
    use crate::models::user::{Authority, CreateUser};
    use crate::repository::InMemoryStore;
    use chrono::Utc;

    fn blank_task() -> Task {
        Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: String::new(),
            description: "  ".to_string(),
            task_status: TaskStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn sample_task() -> Task {
        Task {
            title: "Do the laundry".to_string(),
            description: "With John's clothes".to_string(),
            ..blank_task()
        }
    }

    fn replace(title: Option<&str>, description: Option<&str>, status: Option<TaskStatus>) -> ReplaceTask {
        ReplaceTask {
            title: title.map(str::to_string),
            description: description.map(str::to_string),
            task_status: status,
        }
    }

    struct Fixture {
        service: TaskService,
        store: InMemoryStore,
        admin: AuthContext,
        owner: AuthContext,
        other: AuthContext,
    }

    async fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let mut contexts = Vec::new();
        for (email, authority) in [
            ("jhex@email.com", Authority::Admin),
            ("amelia@email.com", Authority::User),
            ("armando@email.com", Authority::User),
        ] {
            let user = UserRepository::insert(
                &store,
                CreateUser {
                    username: "someone".to_string(),
                    email: email.to_string(),
                    password_hash: "hash".to_string(),
                    authority,
                },
            )
            .await
            .unwrap();
            contexts.push(AuthContext::from_user(&user));
        }
        let other = contexts.pop().unwrap();
        let owner = contexts.pop().unwrap();
        let admin = contexts.pop().unwrap();

        Fixture {
            service: TaskService::new(Arc::new(store.clone()), Arc::new(store.clone())),
            store,
            admin,
            owner,
            other,
        }
    }

    fn new_task(title: &str, description: &str) -> NewTask {
        NewTask {
            title: Some(title.to_string()),
            description: Some(description.to_string()),
            task_status: None,
        }
    }

    #[test]
    fn test_replace_overwrites_all_fields() {
        let mut task = sample_task();
        apply_replace(&mut task, &replace(Some("x"), Some(""), Some(TaskStatus::Completed))).unwrap();

        assert_eq!(task.title, "x");
        assert_eq!(task.description, "");
        assert_eq!(task.task_status, TaskStatus::Completed);
    }

    #[test]
    fn test_replace_rejects_blank_text_without_changes() {
        let mut task = sample_task();
        let before = task.clone();

        let err = apply_replace(&mut task, &replace(Some(" "), Some(""), Some(TaskStatus::Completed)))
            .unwrap_err();
        assert_eq!(err.to_string(), BLANK_TEXT);
        assert_eq!(task, before);
    }

    #[test]
    fn test_replace_requires_every_field() {
        let mut task = sample_task();

        let err = apply_replace(&mut task, &replace(Some("x"), None, Some(TaskStatus::Pending))).unwrap_err();
        assert_eq!(err.to_string(), MISSING_TEXT);

        // Presence is checked before blankness
        let err = apply_replace(&mut task, &replace(None, Some(""), Some(TaskStatus::Pending))).unwrap_err();
        assert_eq!(err.to_string(), MISSING_TEXT);

        let err = apply_replace(&mut task, &replace(Some("x"), Some("y"), None)).unwrap_err();
        assert_eq!(err.to_string(), MISSING_STATUS);
    }

    #[test]
    fn test_patch_requires_a_field() {
        let mut task = sample_task();
        let before = task.clone();

        let err = apply_patch(&mut task, &PatchTask::default()).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTask(ref m) if m == EMPTY_PATCH));
        assert_eq!(task, before);
    }

    #[test]
    fn test_patch_status_only_skips_text_check() {
        let mut task = blank_task();
        let input = PatchTask {
            task_status: Patch::Value(TaskStatus::Completed),
            ..Default::default()
        };

        apply_patch(&mut task, &input).unwrap();
        assert_eq!(task.task_status, TaskStatus::Completed);
    }

    #[test]
    fn test_patch_single_field_may_blank_the_task() {
        let mut task = Task {
            title: "only title".to_string(),
            description: String::new(),
            ..blank_task()
        };
        let input = PatchTask {
            title: Patch::Value(String::new()),
            ..Default::default()
        };

        apply_patch(&mut task, &input).unwrap();
        assert!(task.title.is_empty());
    }

    #[test]
    fn test_patch_both_texts_checked_together() {
        let mut task = sample_task();
        let before = task.clone();
        let input = PatchTask {
            title: Patch::Value(String::new()),
            description: Patch::Value(" ".to_string()),
            task_status: Patch::Value(TaskStatus::Completed),
        };

        let err = apply_patch(&mut task, &input).unwrap_err();
        assert_eq!(err.to_string(), BLANK_TEXT);
        assert_eq!(task, before);
    }

    #[test]
    fn test_patch_null_fields_are_left_alone() {
        let mut task = sample_task();
        let before = task.clone();
        let input = PatchTask {
            title: Patch::Null,
            task_status: Patch::Value(TaskStatus::Completed),
            ..Default::default()
        };

        apply_patch(&mut task, &input).unwrap();
        assert_eq!(task.title, before.title);
        assert_eq!(task.description, before.description);
        assert_eq!(task.task_status, TaskStatus::Completed);
    }

    #[test]
    fn test_patch_all_null_counts_as_empty() {
        let mut task = sample_task();
        let before = task.clone();
        let input: PatchTask = serde_json::from_str(
            r#"{"title": null, "description": null, "taskStatus": null}"#,
        )
        .unwrap();

        let err = apply_patch(&mut task, &input).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_PATCH);
        assert_eq!(task, before);
    }

    #[test]
    fn test_prepare_create_defaults_status() {
        let owner_id = Uuid::new_v4();
        let row = prepare_create(owner_id, new_task("x", "")).unwrap();

        assert_eq!(row.owner_id, owner_id);
        assert_eq!(row.task_status, TaskStatus::Pending);
    }

    #[test]
    fn test_prepare_create_rejects_blank_and_missing() {
        let err = prepare_create(Uuid::new_v4(), new_task("", "")).unwrap_err();
        assert_eq!(err.to_string(), BLANK_TEXT);

        let input = NewTask {
            title: Some("x".to_string()),
            ..Default::default()
        };
        let err = prepare_create(Uuid::new_v4(), input).unwrap_err();
        assert_eq!(err.to_string(), MISSING_TEXT);
    }

    #[tokio::test]
    async fn test_create_own_and_list_own() {
        let f = fixture().await;
        let task = f.service.create_own(&f.owner, new_task("x", "")).await.unwrap();
        assert_eq!(task.owner_id, f.owner.user_id);
        assert_eq!(task.task_status, TaskStatus::Pending);

        let own = f.service.list_own(&f.owner).await.unwrap();
        assert_eq!(own, vec![task]);
        assert!(f.service.list_own(&f.other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_task_is_not_found() {
        let f = fixture().await;
        let task = f.service.create_own(&f.owner, new_task("mine", "")).await.unwrap();

        assert!(matches!(
            f.service.get_own(&f.other, task.id).await,
            Err(ServiceError::TaskNotFound)
        ));
        assert!(matches!(
            f.service.delete_own(&f.other, task.id).await,
            Err(ServiceError::TaskNotFound)
        ));
        let input = PatchTask {
            task_status: Patch::Value(TaskStatus::Completed),
            ..Default::default()
        };
        assert!(matches!(
            f.service.patch_own(&f.other, task.id, input).await,
            Err(ServiceError::TaskNotFound)
        ));

        let unchanged = f.service.get_own(&f.owner, task.id).await.unwrap();
        assert_eq!(unchanged.task_status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_failed_replace_persists_nothing() {
        let f = fixture().await;
        let task = f.service.create_own(&f.owner, new_task("keep", "me")).await.unwrap();

        let result = f
            .service
            .replace_own(&f.owner, task.id, replace(Some(""), Some(""), Some(TaskStatus::Completed)))
            .await;
        assert!(matches!(result, Err(ServiceError::InvalidTask(_))));

        let stored = f.service.get_own(&f.owner, task.id).await.unwrap();
        assert_eq!(stored.title, "keep");
        assert_eq!(stored.task_status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_admin_operations_require_admin() {
        let f = fixture().await;
        let task = f.service.create_own(&f.owner, new_task("x", "")).await.unwrap();

        assert!(matches!(f.service.list_all(&f.owner).await, Err(ServiceError::Forbidden)));
        assert!(matches!(
            f.service.get(&f.owner, task.id).await,
            Err(ServiceError::Forbidden)
        ));
        assert!(matches!(
            f.service.delete(&f.owner, task.id).await,
            Err(ServiceError::Forbidden)
        ));

        let all = f.service.list_all(&f.admin).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].owner.id, f.owner.user_id);
    }

    #[tokio::test]
    async fn test_admin_create_for_user() {
        let f = fixture().await;

        let created = f
            .service
            .create_for_user(&f.admin, f.other.user_id, new_task("assigned", ""))
            .await
            .unwrap();
        assert_eq!(created.owner.id, f.other.user_id);
        assert_eq!(f.service.list_own(&f.other).await.unwrap().len(), 1);

        assert!(matches!(
            f.service
                .create_for_user(&f.admin, Uuid::new_v4(), new_task("nobody", ""))
                .await,
            Err(ServiceError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_admin_patch_and_delete() {
        let f = fixture().await;
        let task = f.service.create_own(&f.owner, new_task("", "text")).await.unwrap();

        let input = PatchTask {
            task_status: Patch::Value(TaskStatus::InProgress),
            ..Default::default()
        };
        let patched = f.service.patch(&f.admin, task.id, input).await.unwrap();
        assert_eq!(patched.task.task_status, TaskStatus::InProgress);
        assert_eq!(patched.owner.id, f.owner.user_id);

        f.service.delete(&f.admin, task.id).await.unwrap();
        assert!(matches!(
            f.service.delete(&f.admin, task.id).await,
            Err(ServiceError::TaskNotFound)
        ));
        assert_eq!(f.store.task_count().await, 0);
    }

    #[tokio::test]
    async fn test_deleted_caller_is_user_not_found() {
        let f = fixture().await;
        UserRepository::delete(&f.store, f.owner.user_id).await.unwrap();

        assert!(matches!(
            f.service.create_own(&f.owner, new_task("x", "")).await,
            Err(ServiceError::UserNotFound)
        ));
    }
}
