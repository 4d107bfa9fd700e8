use axum::{Router, routing::get};
use domain_tasks::{PgTaskRepository, TaskService, handlers};

use crate::state::AppState;

pub mod health;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
///
/// Returns a stateless Router (the domain router has its state applied).
pub fn routes(state: &AppState) -> Router {
    let service = TaskService::new(PgTaskRepository::new(state.db.clone()));

    handlers::router(service, state.jwt_auth.clone())
}

/// `/ready` with a real database check.
///
/// Has its state applied so it can be merged with the stateless app router
/// from `create_router`.
pub fn ready_router(state: AppState) -> Router {
    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
