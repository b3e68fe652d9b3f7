/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; every failure is rendered as
/// the envelope
///
/// ```json
/// { "errors": ["first message", "second message"] }
/// ```
///
/// # Example
///
/// ```
/// use tasklist_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::{json, Value};
///
/// async fn handler() -> ApiResult<Json<Value>> {
///     Err(ApiError::bad_request("either title or description must have text"))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, error};

use tasklist_shared::auth::jwt::JwtError;
use tasklist_shared::error::ServiceError;
use tasklist_shared::models::task::TaskStatus;
use tasklist_shared::models::user::Authority;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400), one message per failure
    BadRequest(Vec<String>),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: Vec<String>,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(vec![message.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msgs) => write!(f, "Bad request: {}", msgs.join(", ")),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let errors = match self {
            ApiError::BadRequest(msgs) => msgs,
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) | ApiError::NotFound(msg) => {
                vec![msg]
            }
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                error!(error = %msg, "Internal error");
                vec!["an internal error occurred".to_string()]
            }
        };

        (status, Json(ErrorResponse { errors })).into_response()
    }
}

/// Convert service errors to API errors
impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::UserNotFound | ServiceError::TaskNotFound => {
                ApiError::NotFound(err.to_string())
            }
            ServiceError::InvalidTask(msg) => ApiError::BadRequest(vec![msg]),
            ServiceError::InvalidUser(msgs) => ApiError::BadRequest(msgs),
            ServiceError::EmailAlreadyExists(_) => ApiError::BadRequest(err.messages()),
            ServiceError::Unauthorized(msg) => ApiError::Unauthorized(msg),
            ServiceError::Forbidden => ApiError::Forbidden(err.to_string()),
            ServiceError::Repository(_) | ServiceError::Password(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

/// Token issuing failures are server-side problems
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::InternalError(format!("Token creation failed: {}", err))
    }
}

fn accepted_values<T: fmt::Display>(values: &[T]) -> String {
    let values: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", values.join(", "))
}

/// Maps a body deserialization failure onto a client-facing message
///
/// Unknown enum variants list the accepted values; everything else is
/// reported as an invalid request body.
pub fn json_rejection_message(detail: &str) -> String {
    if !detail.contains("unknown variant") {
        return "invalid JSON request".to_string();
    }

    let names = |values: &[String]| values.iter().all(|v| detail.contains(&format!("`{v}`")));
    let statuses: Vec<String> = TaskStatus::ALL.iter().map(ToString::to_string).collect();
    let authorities: Vec<String> = Authority::ALL.iter().map(ToString::to_string).collect();

    if names(&statuses) {
        format!("invalid taskStatus. Accepted values: {}", accepted_values(&TaskStatus::ALL))
    } else if names(&authorities) {
        format!("invalid authority. Accepted values: {}", accepted_values(&Authority::ALL))
    } else {
        "invalid JSON request".to_string()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        debug!(%detail, "Rejected request body");
        ApiError::bad_request(json_rejection_message(&detail))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        debug!(detail = %rejection.body_text(), "Rejected path parameter");
        ApiError::bad_request("invalid id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tasklist_shared::repository::RepositoryError;

    #[test]
    fn test_error_display() {
        let err = ApiError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("user was not found".to_string());
        assert_eq!(err.to_string(), "Not found: user was not found");
    }

    #[test]
    fn test_service_error_status_mapping() {
        let cases = [
            (ServiceError::UserNotFound, StatusCode::NOT_FOUND),
            (ServiceError::TaskNotFound, StatusCode::NOT_FOUND),
            (ServiceError::invalid_task("x"), StatusCode::BAD_REQUEST),
            (ServiceError::invalid_user("x"), StatusCode::BAD_REQUEST),
            (
                ServiceError::EmailAlreadyExists("a@email.com".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Unauthorized("email or password are incorrect".to_string()),
                StatusCode::UNAUTHORIZED,
            ),
            (ServiceError::Forbidden, StatusCode::FORBIDDEN),
            (
                ServiceError::Repository(RepositoryError::Database(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (service_error, status) in cases {
            assert_eq!(ApiError::from(service_error).status(), status);
        }
    }

    #[test]
    fn test_invalid_user_keeps_every_message() {
        let err = ApiError::from(ServiceError::InvalidUser(vec![
            "email 'a@email.com' is already taken".to_string(),
            "password must be between 6 and 40 characters".to_string(),
        ]));
        match err {
            ApiError::BadRequest(msgs) => assert_eq!(msgs.len(), 2),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_json_rejection_messages() {
        assert_eq!(
            json_rejection_message(
                "Failed to deserialize the JSON body into the target type: taskStatus: unknown variant `DONE`, expected one of `PENDING`, `IN_PROGRESS`, `COMPLETED` at line 1 column 20"
            ),
            "invalid taskStatus. Accepted values: [PENDING, IN_PROGRESS, COMPLETED]"
        );
        assert_eq!(
            json_rejection_message(
                "Failed to deserialize the JSON body into the target type: authority: unknown variant `ROOT`, expected `USER` or `ADMIN` at line 1 column 18"
            ),
            "invalid authority. Accepted values: [USER, ADMIN]"
        );
        assert_eq!(
            json_rejection_message("Failed to parse the request body as JSON: EOF while parsing"),
            "invalid JSON request"
        );
    }
}
