//! Tasks Domain
//!
//! To-do tasks, their comments, and the HTTP API over them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints, audit events
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Serializers │  ← Per-endpoint request/response shapes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Ownership rules, validation
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + Postgres / in-memory)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Task, Comment, Author, TaskStatus
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use axum_helpers::{JwtAuth, JwtConfig};
//! use domain_tasks::{handlers, InMemoryTaskRepository, TaskService};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = InMemoryTaskRepository::new();
//! let service = TaskService::new(repository);
//!
//! let auth = JwtAuth::new(&JwtConfig::new("a-shared-secret-of-at-least-32-chars")?);
//! let router = handlers::router(service, auth);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod serializers;
pub mod service;

pub use error::{TaskError, TaskResult};
pub use handlers::ApiDoc;
pub use models::{
    Author, AuthoredComment, AuthoredTask, Comment, NewComment, NewTask, Task, TaskChanges,
    TaskFilter, TaskStatus, TaskWithComments,
};
pub use postgres::PgTaskRepository;
pub use repository::{InMemoryTaskRepository, TaskRepository};
pub use service::TaskService;
