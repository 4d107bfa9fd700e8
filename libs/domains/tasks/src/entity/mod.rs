//! Sea-ORM entities for the `tasks`, `comments` and `users` tables.

pub mod comment;
pub mod task;
pub mod user;
