//! REST error envelope.
//!
//! Every failure becomes `{"message": ...}` with a stable message and status.
//! Internal errors are logged and collapsed into a generic 500; their detail
//! never reaches the client.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::auth::AuthError;
use crate::tasks::TaskError;

pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Missing, malformed, or invalid bearer credentials.
    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::UsernameTaken => Self::new(StatusCode::CONFLICT, err.to_string()),
            AuthError::InvalidCredentials => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            AuthError::Internal(e) => {
                error!(err = %e, "auth service failure");
                Self::internal()
            }
        }
    }
}

impl From<TaskError> for ApiError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            TaskError::Internal(e) => {
                error!(err = %e, "task service failure");
                Self::internal()
            }
        }
    }
}
