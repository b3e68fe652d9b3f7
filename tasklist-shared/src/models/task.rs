/// Task model and database operations
///
/// A task is a personal to-do item owned by exactly one user. The owner is an
/// explicit foreign key; deleting the owner cascades to its tasks.
///
/// # Status
///
/// ```text
/// PENDING ⇄ IN_PROGRESS ⇄ COMPLETED
/// ```
///
/// Any status may be set at any time; there is no enforced state machine.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('PENDING', 'IN_PROGRESS', 'COMPLETED');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title TEXT NOT NULL DEFAULT '',
///     description TEXT NOT NULL DEFAULT '',
///     task_status task_status NOT NULL DEFAULT 'PENDING',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;

use super::patch::Patch;

/// Progress of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet
    #[default]
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [
        TaskStatus::Pending,
        TaskStatus::InProgress,
        TaskStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task owned by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID, assigned by the store
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// May be empty, but not together with `description`
    pub title: String,

    /// May be empty, but not together with `title`
    pub description: String,

    pub task_status: TaskStatus,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Row data for inserting a task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub task_status: TaskStatus,
}

/// Creation input
///
/// `title` and `description` must both be supplied; `task_status` defaults
/// to [`TaskStatus::Pending`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_status: Option<TaskStatus>,
}

/// Full replacement input (PUT)
///
/// All three fields are required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub task_status: Option<TaskStatus>,
}

/// Partial update input (PATCH)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTask {
    #[serde(default)]
    pub title: Patch<String>,

    #[serde(default)]
    pub description: Patch<String>,

    #[serde(default)]
    pub task_status: Patch<TaskStatus>,
}

impl PatchTask {
    /// True when no field carries a value; `null` fields count as missing
    pub fn is_empty(&self) -> bool {
        self.title.as_value().is_none()
            && self.description.as_value().is_none()
            && self.task_status.as_value().is_none()
    }
}

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, task_status, created_at, updated_at";

impl Task {
    /// Creates a new task
    ///
    /// # Errors
    ///
    /// Returns an error if the owner does not exist (foreign key violation)
    /// or the database connection fails
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO tasks (owner_id, title, description, task_status)
             VALUES ($1, $2, $3, $4)
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(data.owner_id)
            .bind(data.title)
            .bind(data.description)
            .bind(data.task_status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");

        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists every task, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at, id");

        sqlx::query_as::<_, Task>(&query).fetch_all(pool).await
    }

    /// Lists the tasks of one owner, oldest first
    pub async fn list_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY created_at, id"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Checks that a task exists AND belongs to the given owner
    pub async fn exists_for_owner(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM tasks WHERE id = $1 AND owner_id = $2)")
            .bind(id)
            .bind(owner_id)
            .fetch_one(pool)
            .await
    }

    /// Writes every mutable column of `task` back to its row
    ///
    /// # Returns
    ///
    /// The stored task, or None if no row has this ID
    pub async fn save(pool: &PgPool, task: &Task) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks
             SET owner_id = $2, title = $3, description = $4, task_status = $5,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&query)
            .bind(task.id)
            .bind(task.owner_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.task_status)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a task by ID
    ///
    /// # Returns
    ///
    /// True if the task was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
