//! # Tasklist Shared Library
//!
//! Domain types, validation and business rules of the task list service,
//! independent of the HTTP layer.
//!
//! ## Module Organization
//!
//! - `models`: users, tasks and the request inputs that change them
//! - `validation`: field rules and validation message formatting
//! - `auth`: password hashing, JWT tokens, caller identity and scoping
//! - `repository`: persistence traits with Postgres and in-memory stores
//! - `services`: task and user operations, including PUT/PATCH merges
//! - `db`: connection pool, migrations and demo data
//! - `error`: the service error type

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod validation;

/// Current version of the tasklist shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
