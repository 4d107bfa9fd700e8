//! JSON extractors that reject with [`AppError`] instead of axum's plain-text rejections.

use crate::errors::AppError;
use axum::extract::{FromRequest, Json, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

/// JSON body, deserialized and then validated with `validator`.
///
/// Malformed JSON and wrong types are a 400 `JSON_EXTRACTION`; failed rules
/// are a 400 `VALIDATION_ERROR` with field messages in `details`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct NewTask {
///     #[validate(length(min = 1, max = 255))]
///     title: String,
/// }
///
/// async fn add(ValidatedJson(input): ValidatedJson<NewTask>) -> StatusCode {
///     StatusCode::CREATED
/// }
/// ```
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let JsonBody(data) = JsonBody::<T>::from_request(req, state).await?;
        data.validate()?;
        Ok(ValidatedJson(data))
    }
}

/// JSON body without validation, for handlers that must look something up
/// before the payload is checked.
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await?;
        Ok(JsonBody(data))
    }
}
