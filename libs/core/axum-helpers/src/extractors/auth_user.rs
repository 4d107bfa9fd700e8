use crate::{auth::JwtClaims, errors::AppError};
use axum::{extract::FromRequestParts, http::request::Parts};
use uuid::Uuid;

/// Verified claims placed in request extensions by
/// [`jwt_auth_middleware`](crate::auth::jwt_auth_middleware).
///
/// Only usable on routes behind that middleware; elsewhere it rejects with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

impl AuthUser {
    /// The token subject as a user id.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::Unauthorized("Token subject is not a user id".to_string()))
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<JwtClaims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))
    }
}
