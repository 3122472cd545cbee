use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::models::TaskId;

#[derive(Debug, Error)]
pub enum WorktrackerError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type WorktrackerResult<T> = Result<T, WorktrackerError>;

/// Convert WorktrackerError to AppError for standardized error responses
impl From<WorktrackerError> for AppError {
    fn from(err: WorktrackerError) -> Self {
        match err {
            WorktrackerError::NotFound(id) => AppError::NotFound(format!("Task {} not found", id)),
            WorktrackerError::Validation(msg) => AppError::BadRequest(msg),
            WorktrackerError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for WorktrackerError {
    fn into_response(self) -> Response {
        // Convert to AppError for the standardized error response format
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
