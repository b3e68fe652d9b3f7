/// User model and database operations
///
/// This module provides the User model, the request inputs that create or
/// modify users, and the Postgres queries behind the user gateway.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_authority AS ENUM ('USER', 'ADMIN');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(255) NOT NULL,
///     email VARCHAR(255) NOT NULL,
///     password_hash VARCHAR(255) NOT NULL,
///     authority user_authority NOT NULL DEFAULT 'USER',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::models::user::{Authority, CreateUser, User};
/// use tasklist_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     username: "jdoe".to_string(),
///     email: "jdoe@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     authority: Authority::User,
/// }).await?;
///
/// let found = User::find_by_email(&pool, "jdoe@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::patch::Patch;

/// Privilege level of a user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_authority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    /// Regular user, may only act on its own records
    #[default]
    User,

    /// Administrator, may manage every user and task
    Admin,
}

impl Authority {
    pub const ALL: [Authority; 2] = [Authority::User, Authority::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::User => "USER",
            Authority::Admin => "ADMIN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Authority::Admin)
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account
///
/// The password is only ever held as an Argon2id hash and is never
/// serialized or printed.
#[derive(Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID, assigned by the store
    pub id: Uuid,

    /// Display name without whitespace
    pub username: String,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Privilege level
    pub authority: Authority,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("authority", &self.authority)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Row data for inserting a user
///
/// All fields are already validated; `password_hash` is NOT a plaintext
/// password.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub authority: Authority,
}

/// Registration / creation input
///
/// Missing keys deserialize to empty strings so they are reported as
/// "must not be empty" instead of as a malformed body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewUser {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_username"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_email"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_password"))]
    pub password: String,

    /// Only honored when the creator is an authenticated administrator
    #[serde(default)]
    pub authority: Option<Authority>,
}

/// Full replacement input (PUT)
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ReplaceUser {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_username"))]
    pub username: String,

    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_email"))]
    pub email: String,

    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_password"))]
    pub password: String,

    /// Only honored for privileged callers
    #[serde(default)]
    pub authority: Option<Authority>,
}

/// Partial update input (PATCH)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PatchUser {
    #[serde(default)]
    pub username: Patch<String>,

    #[serde(default)]
    pub email: Patch<String>,

    #[serde(default)]
    pub password: Patch<String>,

    /// Silently ignored for unprivileged callers
    #[serde(default)]
    pub authority: Patch<Authority>,
}

/// Login input
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginUser {
    #[serde(default)]
    #[validate(custom(function = "crate::validation::validate_login_email"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "password must be provided"))]
    pub password: String,
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, authority, created_at, updated_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint `users_email_key`)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash, authority)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.password_hash)
            .bind(data.authority)
            .fetch_one(pool)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (exact match)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Lists all users, oldest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id");

        sqlx::query_as::<_, User>(&query).fetch_all(pool).await
    }

    pub async fn exists(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn email_exists(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(pool)
            .await
    }

    /// Writes every mutable column of `user` back to its row
    ///
    /// The `updated_at` timestamp is set to the current time.
    ///
    /// # Returns
    ///
    /// The stored user, or None if no row has this ID
    pub async fn save(pool: &PgPool, user: &User) -> Result<Option<Self>, sqlx::Error> {
        let query = format!(
            "UPDATE users
             SET username = $2, email = $3, password_hash = $4, authority = $5,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(user.id)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.authority)
            .fetch_optional(pool)
            .await
    }

    /// Deletes a user by ID
    ///
    /// Tasks owned by the user are removed by the `ON DELETE CASCADE` rule.
    ///
    /// # Returns
    ///
    /// True if the user was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
