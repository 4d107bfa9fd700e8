use axum::{http::StatusCode, response::Response};

use super::{ErrorCode, error_response};

/// Router fallback: unmatched paths get the standard JSON 404 body.
pub async fn not_found() -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        ErrorCode::NotFound.default_message().to_string(),
        ErrorCode::NotFound,
    )
}
