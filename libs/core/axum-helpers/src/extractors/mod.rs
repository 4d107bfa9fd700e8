//! Extractors that reject with [`AppError`](crate::errors::AppError).

pub mod auth_user;
pub mod id_path;
pub mod validated_json;

pub use auth_user::AuthUser;
pub use id_path::IdPath;
pub use validated_json::{JsonBody, ValidatedJson};
