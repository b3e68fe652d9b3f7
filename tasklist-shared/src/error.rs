/// Error type shared by the task and user services
///
/// Every variant is recoverable at the HTTP boundary; the API crate maps
/// them onto status codes and the `{"errors": [...]}` envelope.

use crate::auth::password::PasswordError;
use crate::repository::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// User absent, or not visible to the caller
    #[error("user was not found")]
    UserNotFound,

    /// Task absent, or owned by someone other than the caller
    #[error("task was not found")]
    TaskNotFound,

    #[error("{0}")]
    InvalidTask(String),

    /// One or more field-level failures, in the order they were found
    #[error("{}", .0.join(", "))]
    InvalidUser(Vec<String>),

    #[error("email '{0}' is already taken")]
    EmailAlreadyExists(String),

    /// Credential mismatch
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to use the operation at all
    #[error("access denied")]
    Forbidden,

    #[error(transparent)]
    Repository(RepositoryError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl ServiceError {
    pub fn invalid_task(message: impl Into<String>) -> Self {
        ServiceError::InvalidTask(message.into())
    }

    pub fn invalid_user(message: impl Into<String>) -> Self {
        ServiceError::InvalidUser(vec![message.into()])
    }

    /// Client-facing messages, one per failure
    pub fn messages(&self) -> Vec<String> {
        match self {
            ServiceError::InvalidUser(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }

    /// True for failures caused by infrastructure rather than the request
    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Repository(_) | ServiceError::Password(_))
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            // Lost a check-then-act race against a concurrent writer
            RepositoryError::EmailTaken(email) => ServiceError::EmailAlreadyExists(email),
            RepositoryError::OwnerNotFound(_) => ServiceError::UserNotFound,
            other => ServiceError::Repository(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_user_keeps_every_message() {
        let error = ServiceError::InvalidUser(vec![
            "email 'x@email.com' is already taken".to_string(),
            "password must be between 6 and 40 characters".to_string(),
        ]);
        assert_eq!(error.messages().len(), 2);
        assert_eq!(
            error.to_string(),
            "email 'x@email.com' is already taken, password must be between 6 and 40 characters"
        );
    }

    #[test]
    fn test_single_message_variants() {
        assert_eq!(ServiceError::TaskNotFound.messages(), vec!["task was not found"]);
        assert_eq!(
            ServiceError::EmailAlreadyExists("a@email.com".to_string()).messages(),
            vec!["email 'a@email.com' is already taken"]
        );
    }

    #[test]
    fn test_repository_email_race_maps_to_email_exists() {
        let error: ServiceError = RepositoryError::EmailTaken("a@email.com".to_string()).into();
        assert!(matches!(error, ServiceError::EmailAlreadyExists(ref e) if e == "a@email.com"));
        assert!(!error.is_internal());
    }

    #[test]
    fn test_database_errors_are_internal() {
        let error: ServiceError = RepositoryError::Database(sqlx::Error::PoolTimedOut).into();
        assert!(error.is_internal());
    }
}
