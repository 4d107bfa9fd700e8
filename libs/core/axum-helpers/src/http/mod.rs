//! Cross-cutting HTTP layers applied by [`create_router`](crate::server::create_router).

pub mod cors;
pub mod security;

pub use cors::{CORS_ENV_VAR, create_cors_layer};
pub use security::security_headers;
