//! Application state management.
//!
//! Shared by the route builders and the shutdown cleanup:
//! - Configuration
//! - PostgreSQL connection pool
//! - JWT verifier for protected routes

use axum_helpers::JwtAuth;
use database::postgres::DatabaseConnection;

/// Shared application state.
///
/// Cloning is cheap: the connection pool and the verifier are reference counted.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// PostgreSQL database connection pool
    pub db: DatabaseConnection,
    /// Verifies bearer tokens issued by the identity service
    pub jwt_auth: JwtAuth,
}
