/// Response projections
///
/// Records are never serialized directly: every response goes through one of
/// these views, so password hashes and internal timestamps stay out of the
/// wire format. All views use camelCase keys.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tasklist_shared::models::task::{Task, TaskStatus};
use tasklist_shared::models::user::{Authority, User};
use tasklist_shared::services::{TaskWithOwner, UserWithTasks};

/// Owner summary nested in [`TaskView`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&User> for OwnerView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// Task with its owner, for administrator routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub task_status: TaskStatus,
    pub user: OwnerView,
}

impl From<TaskWithOwner> for TaskView {
    fn from(TaskWithOwner { task, owner }: TaskWithOwner) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            task_status: task.task_status,
            user: OwnerView::from(&owner),
        }
    }
}

/// Task without owner, for the caller's own tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedTaskView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub task_status: TaskStatus,
}

impl From<Task> for OwnedTaskView {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            task_status: task.task_status,
        }
    }
}

fn owned(tasks: Vec<Task>) -> Vec<OwnedTaskView> {
    tasks.into_iter().map(OwnedTaskView::from).collect()
}

/// User with its tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub tasks: Vec<OwnedTaskView>,
}

impl From<UserWithTasks> for UserView {
    fn from(UserWithTasks { user, tasks }: UserWithTasks) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            tasks: owned(tasks),
        }
    }
}

/// User with authority and tasks, for administrator routes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedUserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub authority: Authority,
    pub tasks: Vec<OwnedTaskView>,
}

impl From<UserWithTasks> for ExtendedUserView {
    fn from(UserWithTasks { user, tasks }: UserWithTasks) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            authority: user.authority,
            tasks: owned(tasks),
        }
    }
}

/// Collects a list of records into views
pub fn views<T, V: From<T>>(items: Vec<T>) -> Vec<V> {
    items.into_iter().map(V::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "amelia_1990".to_string(),
            email: "amelia@email.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            authority: Authority::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(owner_id: Uuid) -> Task {
        Task {
            id: Uuid::new_v4(),
            owner_id,
            title: "Do the dishes".to_string(),
            description: String::new(),
            task_status: TaskStatus::InProgress,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_task_view_json_shape() {
        let owner = user();
        let task = task(owner.id);
        let view = TaskView::from(TaskWithOwner {
            task: task.clone(),
            owner: owner.clone(),
        });

        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            json!({
                "id": task.id,
                "title": "Do the dishes",
                "description": "",
                "taskStatus": "IN_PROGRESS",
                "user": {
                    "id": owner.id,
                    "username": "amelia_1990",
                    "email": "amelia@email.com",
                },
            })
        );
    }

    #[test]
    fn test_user_views_hide_password() {
        let owner = user();
        let tasks = vec![task(owner.id)];
        let entry = UserWithTasks { user: owner, tasks };

        let plain = serde_json::to_string(&UserView::from(entry.clone())).unwrap();
        assert!(!plain.contains("argon2"));
        assert!(!plain.contains("authority"));

        let extended = serde_json::to_value(ExtendedUserView::from(entry)).unwrap();
        assert_eq!(extended["authority"], "USER");
        assert_eq!(extended["tasks"][0]["taskStatus"], "IN_PROGRESS");
        assert!(extended.get("passwordHash").is_none());
    }
}
