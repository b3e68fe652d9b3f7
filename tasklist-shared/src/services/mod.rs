/// Task and user use cases
///
/// Services are constructed from the repository traits and carry no other
/// state, so they are cheap to clone into request handlers. Every operation
/// takes the caller's [`AuthContext`](crate::auth::middleware::AuthContext)
/// and enforces the privilege it needs.

pub mod tasks;
pub mod users;

pub use tasks::{TaskService, TaskWithOwner};
pub use users::{UserService, UserWithTasks};
