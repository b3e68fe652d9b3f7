/// PostgreSQL gateway implementations
///
/// Thin adapters over the model queries. Constraint violations are mapped
/// onto [`RepositoryError`] variants so the services can tell a lost email
/// race apart from an infrastructure failure.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::db::pool::health_check;
use crate::models::task::{CreateTask, Task};
use crate::models::user::{CreateUser, User};

/// Name of the unique constraint on `users.email`
const EMAIL_CONSTRAINT: &str = "users_email_key";

fn map_user_write(error: sqlx::Error, email: &str) -> RepositoryError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() && db_error.constraint() == Some(EMAIL_CONSTRAINT) {
            return RepositoryError::EmailTaken(email.to_string());
        }
    }
    RepositoryError::Database(error)
}

fn map_task_write(error: sqlx::Error, owner_id: Uuid) -> RepositoryError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_foreign_key_violation() {
            return RepositoryError::OwnerNotFound(owner_id);
        }
    }
    RepositoryError::Database(error)
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn exists_by_id(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(User::exists(&self.pool, id).await?)
    }

    async fn exists_by_email(&self, email: &str) -> RepositoryResult<bool> {
        Ok(User::email_exists(&self.pool, email).await?)
    }

    async fn insert(&self, user: CreateUser) -> RepositoryResult<User> {
        let email = user.email.clone();
        User::create(&self.pool, user)
            .await
            .map_err(|e| map_user_write(e, &email))
    }

    async fn update(&self, user: &User) -> RepositoryResult<Option<User>> {
        User::save(&self.pool, user)
            .await
            .map_err(|e| map_user_write(e, &user.email))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }

    async fn ping(&self) -> RepositoryResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}

#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_all(&self) -> RepositoryResult<Vec<Task>> {
        Ok(Task::list(&self.pool).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_owner(&self, owner_id: Uuid) -> RepositoryResult<Vec<Task>> {
        Ok(Task::list_by_owner(&self.pool, owner_id).await?)
    }

    async fn exists_for_owner(&self, task_id: Uuid, owner_id: Uuid) -> RepositoryResult<bool> {
        Ok(Task::exists_for_owner(&self.pool, task_id, owner_id).await?)
    }

    async fn insert(&self, task: CreateTask) -> RepositoryResult<Task> {
        let owner_id = task.owner_id;
        Task::create(&self.pool, task)
            .await
            .map_err(|e| map_task_write(e, owner_id))
    }

    async fn update(&self, task: &Task) -> RepositoryResult<Option<Task>> {
        Task::save(&self.pool, task)
            .await
            .map_err(|e| map_task_write(e, task.owner_id))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }
}
