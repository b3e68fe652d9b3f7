/// In-memory gateway implementation
///
/// One store backs both [`UserRepository`] and [`TaskRepository`] so the
/// cascade from users to tasks can be applied under a single lock. Records
/// are kept in insertion order, which doubles as "oldest first".
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasklist_shared::repository::{InMemoryStore, TaskRepository, UserRepository};
///
/// let store = InMemoryStore::new();
/// let users: Arc<dyn UserRepository> = Arc::new(store.clone());
/// let tasks: Arc<dyn TaskRepository> = Arc::new(store);
/// ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    tasks: Vec<Task>,

    /// Unique index: email -> user ID
    emails: HashMap<String, Uuid>,
}

impl StoreState {
    fn user_position(&self, id: Uuid) -> Option<usize> {
        self.users.iter().position(|user| user.id == id)
    }

    fn task_position(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn email_owner(&self, email: &str) -> Option<Uuid> {
        self.emails.get(email).copied()
    }
}

/// Process-local store for users and tasks
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.state.read().await.users.len()
    }

    pub async fn task_count(&self) -> usize {
        self.state.read().await.tasks.len()
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(self.state.read().await.users.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.iter().find(|user| user.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .email_owner(email)
            .and_then(|id| state.users.iter().find(|user| user.id == id))
            .cloned())
    }

    async fn exists_by_id(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.state.read().await.user_position(id).is_some())
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        Ok(self.state.read().await.email_owner(email).is_some())
    }

    async fn insert(&self, data: CreateUser) -> RepositoryResult<User> {
        let mut state = self.state.write().await;

        if state.email_owner(&data.email).is_some() {
            return Err(RepositoryError::EmailTaken(data.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: data.username,
            email: data.email,
            password_hash: data.password_hash,
            authority: data.authority,
            created_at: now,
            updated_at: now,
        };

        state.emails.insert(user.email.clone(), user.id);
        state.users.push(user.clone());
        debug!(user_id = %user.id, "Inserted user");
        Ok(user)
    }

    async fn update(&self, user: &User) -> RepositoryResult<Option<User>> {
        let mut state = self.state.write().await;

        let Some(position) = state.user_position(user.id) else {
            return Ok(None);
        };

        match state.email_owner(&user.email) {
            Some(owner) if owner != user.id => {
                return Err(RepositoryError::EmailTaken(user.email.clone()));
            }
            _ => {}
        }

        let previous_email = state.users[position].email.clone();
        if previous_email != user.email {
            state.emails.remove(&previous_email);
            state.emails.insert(user.email.clone(), user.id);
        }

        let mut stored = user.clone();
        stored.created_at = state.users[position].created_at;
        stored.updated_at = Utc::now();
        state.users[position] = stored.clone();
        Ok(Some(stored))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;

        let Some(position) = state.user_position(id) else {
            return Ok(false);
        };

        let user = state.users.remove(position);
        state.emails.remove(&user.email);

        let before = state.tasks.len();
        state.tasks.retain(|task| task.owner_id != id);
        debug!(
            user_id = %id,
            cascaded_tasks = before - state.tasks.len(),
            "Deleted user"
        );
        Ok(true)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn find_all(&self) -> RepositoryResult<Vec<Task>> {
        Ok(self.state.read().await.tasks.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        let state = self.state.read().await;
        Ok(state.tasks.iter().find(|task| task.id == id).cloned())
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> RepositoryResult<Vec<Task>> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .filter(|task| task.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn exists_for_owner(&self, task_id: Uuid, owner_id: Uuid) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .tasks
            .iter()
            .any(|task| task.id == task_id && task.owner_id == owner_id))
    }

    async fn insert(&self, data: CreateTask) -> RepositoryResult<Task> {
        let mut state = self.state.write().await;

        if state.user_position(data.owner_id).is_none() {
            return Err(RepositoryError::OwnerNotFound(data.owner_id));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            task_status: data.task_status,
            created_at: now,
            updated_at: now,
        };

        state.tasks.push(task.clone());
        debug!(task_id = %task.id, owner_id = %task.owner_id, "Inserted task");
        Ok(task)
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Option<Task>> {
        let mut state = self.state.write().await;

        if state.user_position(task.owner_id).is_none() {
            return Err(RepositoryError::OwnerNotFound(task.owner_id));
        }

        let Some(position) = state.task_position(task.id) else {
            return Ok(None);
        };

        let mut stored = task.clone();
        stored.created_at = state.tasks[position].created_at;
        stored.updated_at = Utc::now();
        state.tasks[position] = stored.clone();
        Ok(Some(stored))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let mut state = self.state.write().await;

        match state.task_position(id) {
            Some(position) => {
                state.tasks.remove(position);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
