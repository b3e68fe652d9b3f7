/// Persistence gateway
///
/// The services only see these traits. Two implementations exist:
///
/// - [`postgres`]: sqlx-backed, delegating to the model queries
/// - [`memory`]: process-local store used by tests and database-less runs
///
/// Both enforce the same contract: email is a unique index over users, and
/// deleting a user deletes its tasks.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::{PgTaskRepository, PgUserRepository};

/// Error type for gateway operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The unique email index rejected a write
    #[error("email '{0}' is already taken")]
    EmailTaken(String),

    /// A task referenced a user that does not exist
    #[error("owner {0} does not exist")]
    OwnerNotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Port for user persistence
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, oldest first
    async fn find_all(&self) -> RepositoryResult<Vec<User>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn exists_by_id(&self, id: Uuid) -> RepositoryResult<bool>;

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool>;

    /// Stores a new user and returns it with its assigned ID
    async fn insert(&self, user: CreateUser) -> RepositoryResult<User>;

    /// Overwrites the stored record with the same ID
    ///
    /// Returns None when no such record exists.
    async fn update(&self, user: &User) -> RepositoryResult<Option<User>>;

    /// Deletes the user and, by cascade, its tasks
    ///
    /// Returns false when no such record exists.
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;

    /// Cheap liveness check for the health endpoint
    async fn ping(&self) -> RepositoryResult<()>;
}

/// Port for task persistence
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks, oldest first
    async fn find_all(&self) -> RepositoryResult<Vec<Task>>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>>;

    /// Tasks of one owner, oldest first
    async fn find_by_owner(&self, owner_id: Uuid) -> RepositoryResult<Vec<Task>>;

    /// True only if the task exists AND belongs to `owner_id`
    async fn exists_for_owner(&self, task_id: Uuid, owner_id: Uuid) -> RepositoryResult<bool>;

    async fn insert(&self, task: CreateTask) -> RepositoryResult<Task>;

    /// Returns None when no such record exists
    async fn update(&self, task: &Task) -> RepositoryResult<Option<Task>>;

    /// Returns false when no such record exists
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}
