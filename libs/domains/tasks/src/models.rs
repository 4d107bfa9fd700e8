use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

/// Task status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    DeriveActiveEnum,
    EnumIter,
    ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "deferred")]
    Deferred,
    #[sea_orm(string_value = "done")]
    Done,
}

impl TaskStatus {
    pub const CHOICES: [TaskStatus; 3] = [TaskStatus::Active, TaskStatus::Deferred, TaskStatus::Done];

    /// Display label shown to end users.
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Active => "активно",
            TaskStatus::Deferred => "отложено",
            TaskStatus::Done => "выполнено",
        }
    }
}

/// User row owned by the identity service; read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub message: String,
    /// Time of the last save
    pub date_add: DateTime<Utc>,
    /// Visible on the public list and detail endpoints
    pub public: bool,
    pub important: bool,
    pub author: Uuid,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Comment {
    pub id: i64,
    pub author: Uuid,
    pub task: i64,
    pub date_add: DateTime<Utc>,
    pub message: String,
}

/// A task together with its author row.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredTask {
    pub task: Task,
    pub author: Author,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredComment {
    pub comment: Comment,
    pub author: Author,
}

/// Everything the detail endpoint renders, loaded in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskWithComments {
    pub task: Task,
    pub author: Author,
    /// Ordered by `date_add`, then `id`
    pub comments: Vec<AuthoredComment>,
}

/// Validated insert for a task; `author` always comes from the requester.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub message: String,
    pub public: bool,
    pub important: bool,
    pub status: TaskStatus,
    pub author: Uuid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub author: Uuid,
    pub task: i64,
    pub message: String,
}

/// Validated partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub message: Option<String>,
    pub public: Option<bool>,
    pub important: Option<bool>,
    pub status: Option<TaskStatus>,
}

impl Task {
    pub fn apply_changes(&mut self, changes: TaskChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(message) = changes.message {
            self.message = message;
        }
        if let Some(public) = changes.public {
            self.public = public;
        }
        if let Some(important) = changes.important {
            self.important = important;
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
    }
}

/// Filter for the public task list. `public = true` is always implied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub important: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn task() -> Task {
        Task {
            id: 1,
            title: "Buy milk".into(),
            message: "2%".into(),
            date_add: Utc::now(),
            public: false,
            important: false,
            author: Uuid::new_v4(),
            status: TaskStatus::Active,
        }
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in TaskStatus::CHOICES {
            assert_eq!(TaskStatus::from_str(&status.to_string()).unwrap(), status);
        }
        assert!(TaskStatus::from_str("archived").is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(TaskStatus::Active.label(), "активно");
        assert_eq!(TaskStatus::Deferred.label(), "отложено");
        assert_eq!(TaskStatus::Done.label(), "выполнено");
    }

    #[test]
    fn test_apply_changes_touches_only_present_fields() {
        let mut task = task();
        task.apply_changes(TaskChanges {
            public: Some(true),
            status: Some(TaskStatus::Done),
            ..Default::default()
        });

        assert!(task.public);
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.message, "2%");
        assert!(!task.important);
    }
}
