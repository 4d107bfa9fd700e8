use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, FieldErrors};
use sea_orm::DbErr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum TaskError {
    /// Detail lookup restricted to published tasks came back empty.
    #[error("Published task with id={0} not found")]
    PublishedNotFound(i64),

    /// Ownership-scoped lookup came back empty; absent and foreign tasks look the same.
    #[error("Task with id={id} for user {username} not found")]
    NotOwned { id: i64, username: String },

    #[error("Task with id={0} not found")]
    NotFound(i64),

    #[error("Invalid input: {0:?}")]
    Validation(FieldErrors),

    /// Token subject does not name a known user.
    #[error("Unknown user {0}")]
    Unauthenticated(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl TaskError {
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = FieldErrors::new();
        errors.insert(field.to_string(), vec![message.into()]);
        TaskError::Validation(errors)
    }
}

impl From<validator::ValidationErrors> for TaskError {
    fn from(errors: validator::ValidationErrors) -> Self {
        TaskError::Validation(axum_helpers::errors::field_errors(&errors))
    }
}

/// Convert TaskError to AppError for standardized error responses
impl From<TaskError> for AppError {
    fn from(err: TaskError) -> Self {
        match err {
            e @ (TaskError::PublishedNotFound(_)
            | TaskError::NotOwned { .. }
            | TaskError::NotFound(_)) => AppError::NotFound(e.to_string()),
            TaskError::Validation(fields) => AppError::InvalidFields(fields),
            TaskError::Unauthenticated(_) => {
                AppError::Unauthorized("Authentication credentials were not provided".to_string())
            }
            TaskError::Database(e) => AppError::Database(e),
        }
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_variants_share_status() {
        let errors = [
            TaskError::PublishedNotFound(3),
            TaskError::NotOwned {
                id: 3,
                username: "alice".into(),
            },
            TaskError::NotFound(3),
        ];
        for err in errors {
            assert_eq!(AppError::from(err).status(), StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn test_messages_name_the_id() {
        assert_eq!(
            TaskError::PublishedNotFound(12).to_string(),
            "Published task with id=12 not found"
        );
        assert_eq!(
            TaskError::NotOwned {
                id: 5,
                username: "bob".into()
            }
            .to_string(),
            "Task with id=5 for user bob not found"
        );
    }

    #[test]
    fn test_status_mapping() {
        let validation = AppError::from(TaskError::field("title", "This field may not be blank."));
        assert_eq!(validation.status(), StatusCode::BAD_REQUEST);

        let unauthenticated = AppError::from(TaskError::Unauthenticated(Uuid::nil()));
        assert_eq!(unauthenticated.status(), StatusCode::UNAUTHORIZED);

        let database = AppError::from(TaskError::Database(DbErr::Custom("boom".into())));
        assert_eq!(database.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
