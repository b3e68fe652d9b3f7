/// Domain models for the task list
///
/// # Models
///
/// - `user`: User accounts, authority levels and user inputs
/// - `task`: Tasks, task status and task inputs
/// - `patch`: Tri-state field used by partial updates
///
/// Each model carries its own Postgres queries as associated functions;
/// the [`crate::repository`] gateways wrap them behind traits.

pub mod patch;
pub mod task;
pub mod user;
