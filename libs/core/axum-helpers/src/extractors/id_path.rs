//! Integer id path parameter.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};

/// Single `{id}` path segment parsed as `i64`.
///
/// A segment that is not an integer never names a row, so it is reported as
/// 404 rather than 400.
///
/// ```ignore
/// async fn detail(IdPath(id): IdPath) -> String {
///     format!("task {id}")
/// }
///
/// let app = Router::new().route("/task/{id}/", get(detail));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdPath(pub i64);

impl<S> FromRequestParts<S> for IdPath
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InternalServerError(e.body_text()))?;

        raw.parse::<i64>()
            .map(IdPath)
            .map_err(|_| AppError::NotFound(format!("No resource with id '{raw}'")))
    }
}
