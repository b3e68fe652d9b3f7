/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration and login
/// - `tasks`: Task administration and the caller's own tasks
/// - `users`: User administration and the caller's own account
/// - `views`: JSON projections shared by the handlers

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
pub mod views;
