//! Request and response shapes.
//!
//! Every endpoint has its own projection of the task and comment rows. Fields
//! the server owns (`id`, `author`, `date_add`, a comment's `task`) never
//! appear in an input type, so client-supplied values are dropped during
//! deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{TaskError, TaskResult};
use crate::models::{
    Author, AuthoredComment, AuthoredTask, Comment, NewComment, NewTask, Task, TaskChanges,
    TaskStatus, TaskWithComments,
};

/// Human-readable timestamp used by the detail endpoint, e.g. `05 March 2024 14:07:09`.
pub const DETAIL_DATE_FORMAT: &str = "%d %B %Y %H:%M:%S";

const TITLE_MAX_CHARS: usize = 255;

// ============================================================================
// Output shapes
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub date_joined: DateTime<Utc>,
}

impl From<Author> for AuthorView {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            username: author.username,
            email: author.email,
            date_joined: author.date_joined,
        }
    }
}

/// Row of `GET /tasks/`; the author is reduced to a username.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskListItem {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub date_add: DateTime<Utc>,
    pub public: bool,
    pub important: bool,
    pub status: TaskStatus,
    #[schema(example = "alice")]
    pub author: String,
}

impl From<AuthoredTask> for TaskListItem {
    fn from(AuthoredTask { task, author }: AuthoredTask) -> Self {
        Self {
            id: task.id,
            title: task.title,
            message: task.message,
            date_add: task.date_add,
            public: task.public,
            important: task.important,
            status: task.status,
            author: author.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentView {
    pub comment_id: i64,
    pub message: String,
    pub date_add: DateTime<Utc>,
    pub author: AuthorView,
}

impl From<AuthoredComment> for CommentView {
    fn from(AuthoredComment { comment, author }: AuthoredComment) -> Self {
        Self {
            comment_id: comment.id,
            message: comment.message,
            date_add: comment.date_add,
            author: author.into(),
        }
    }
}

/// Body of `GET /task/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskDetail {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[schema(example = "05 March 2024 14:07:09")]
    pub date_add: String,
    pub public: bool,
    pub important: bool,
    pub status: TaskStatus,
    pub author: AuthorView,
    pub comments: Vec<CommentView>,
}

impl From<TaskWithComments> for TaskDetail {
    fn from(detail: TaskWithComments) -> Self {
        let TaskWithComments {
            task,
            author,
            comments,
        } = detail;

        Self {
            id: task.id,
            title: task.title,
            message: task.message,
            date_add: task.date_add.format(DETAIL_DATE_FORMAT).to_string(),
            public: task.public,
            important: task.important,
            status: task.status,
            author: author.into(),
            comments: comments.into_iter().map(Into::into).collect(),
        }
    }
}

/// Response of task create and update.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskEditorView {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub date_add: DateTime<Utc>,
    pub public: bool,
    pub important: bool,
    pub status: TaskStatus,
    pub author: AuthorView,
}

impl From<AuthoredTask> for TaskEditorView {
    fn from(AuthoredTask { task, author }: AuthoredTask) -> Self {
        Self {
            id: task.id,
            title: task.title,
            message: task.message,
            date_add: task.date_add,
            public: task.public,
            important: task.important,
            status: task.status,
            author: author.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskMini {
    pub id: i64,
    pub title: String,
}

/// Response of comment add.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CommentCreated {
    pub id: i64,
    pub message: String,
    pub date_add: DateTime<Utc>,
    pub author: AuthorView,
    pub task: TaskMini,
}

impl CommentCreated {
    pub fn new(comment: Comment, author: Author, task: &Task) -> Self {
        Self {
            id: comment.id,
            message: comment.message,
            date_add: comment.date_add,
            author: author.into(),
            task: TaskMini {
                id: task.id,
                title: task.title.clone(),
            },
        }
    }
}

// ============================================================================
// Input shapes
// ============================================================================
//
// Writable fields arrive as raw JSON values so that a wrongly typed field is
// reported under its own name instead of failing the whole body. An explicit
// `null` is kept apart from an absent key: absent means "not provided",
// `null` is rejected.

const NULL_MESSAGE: &str = "This field may not be null.";

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// `Some(value)` whenever the key is present, including `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Strings as given; numbers in their decimal form.
fn parse_text(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Err(invalid("null", NULL_MESSAGE)),
        _ => Err(invalid("invalid", "Not a valid string.")),
    }
}

fn parse_title(value: &Value) -> Result<String, ValidationError> {
    let title = parse_text(value)?.trim().to_string();
    if title.is_empty() {
        return Err(invalid("blank", "This field may not be blank."));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(invalid(
            "max_length",
            format!("Ensure this field has no more than {TITLE_MAX_CHARS} characters."),
        ));
    }
    Ok(title)
}

/// Boolean-like spellings: `true/t/yes/y/on/1` and `false/f/no/n/off/0`, any case.
fn bool_from_str(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn parse_bool(value: &Value) -> Result<bool, ValidationError> {
    let parsed = match value {
        Value::Bool(flag) => Some(*flag),
        Value::String(raw) => bool_from_str(raw),
        Value::Number(number) => match number.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::Null => return Err(invalid("null", NULL_MESSAGE)),
        _ => None,
    };
    parsed.ok_or_else(|| invalid("invalid", "Must be a valid boolean."))
}

fn parse_status(value: &Value) -> Result<TaskStatus, ValidationError> {
    let raw = match value {
        Value::String(raw) => raw.clone(),
        Value::Null => return Err(invalid("null", NULL_MESSAGE)),
        other => other.to_string(),
    };
    raw.parse()
        .map_err(|_| invalid("invalid_choice", format!("\"{raw}\" is not a valid choice.")))
}

fn validate_title(value: &Value) -> Result<(), ValidationError> {
    parse_title(value).map(drop)
}

fn validate_text(value: &Value) -> Result<(), ValidationError> {
    parse_text(value).map(drop)
}

fn validate_bool(value: &Value) -> Result<(), ValidationError> {
    parse_bool(value).map(drop)
}

fn validate_status(value: &Value) -> Result<(), ValidationError> {
    parse_status(value).map(drop)
}

/// Parse an optional raw field, reporting failures under `field`.
fn parsed<T>(
    field: &str,
    value: Option<&Value>,
    parse: fn(&Value) -> Result<T, ValidationError>,
) -> TaskResult<Option<T>> {
    value
        .map(parse)
        .transpose()
        .map_err(|e| TaskError::field(field, e.to_string()))
}

/// Body of `POST /task/add/`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct TaskEditorInput {
    #[serde(default, deserialize_with = "present")]
    #[validate(
        required(message = "This field is required."),
        custom(function = "validate_title")
    )]
    #[schema(value_type = String, example = "Buy milk", max_length = 255)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_text"))]
    #[schema(value_type = Option<String>)]
    pub message: Option<Value>,
    /// Boolean or a boolean-like string such as `"true"` or `"0"`
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_bool"))]
    #[schema(value_type = Option<bool>)]
    pub public: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_bool"))]
    #[schema(value_type = Option<bool>)]
    pub important: Option<Value>,
    /// One of `active`, `deferred`, `done`
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_status"))]
    #[schema(value_type = Option<String>, example = "active")]
    pub status: Option<Value>,
}

impl TaskEditorInput {
    /// Build the insert for `author`. Call after [`Validate::validate`].
    pub fn into_new_task(self, author: Uuid) -> TaskResult<NewTask> {
        let title = parsed("title", self.title.as_ref(), parse_title)?
            .ok_or_else(|| TaskError::field("title", "This field is required."))?;

        Ok(NewTask {
            title,
            message: parsed("message", self.message.as_ref(), parse_text)?.unwrap_or_default(),
            public: parsed("public", self.public.as_ref(), parse_bool)?.unwrap_or(false),
            important: parsed("important", self.important.as_ref(), parse_bool)?.unwrap_or(false),
            status: parsed("status", self.status.as_ref(), parse_status)?.unwrap_or_default(),
            author,
        })
    }
}

/// Body of `PATCH /task/{id}/save/`; absent fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct TaskPatchInput {
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_title"))]
    #[schema(value_type = Option<String>, max_length = 255)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_text"))]
    #[schema(value_type = Option<String>)]
    pub message: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_bool"))]
    #[schema(value_type = Option<bool>)]
    pub public: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_bool"))]
    #[schema(value_type = Option<bool>)]
    pub important: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_status"))]
    #[schema(value_type = Option<String>)]
    pub status: Option<Value>,
}

impl TaskPatchInput {
    pub fn into_changes(self) -> TaskResult<TaskChanges> {
        Ok(TaskChanges {
            title: parsed("title", self.title.as_ref(), parse_title)?,
            message: parsed("message", self.message.as_ref(), parse_text)?,
            public: parsed("public", self.public.as_ref(), parse_bool)?,
            important: parsed("important", self.important.as_ref(), parse_bool)?,
            status: parsed("status", self.status.as_ref(), parse_status)?,
        })
    }
}

/// Body of `POST /comment/{id}/add/`.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CommentAddInput {
    #[serde(default, deserialize_with = "present")]
    #[validate(custom(function = "validate_text"))]
    #[schema(value_type = Option<String>)]
    pub message: Option<Value>,
}

impl CommentAddInput {
    pub fn into_new_comment(self, author: Uuid, task: i64) -> TaskResult<NewComment> {
        Ok(NewComment {
            author,
            task,
            message: parsed("message", self.message.as_ref(), parse_text)?.unwrap_or_default(),
        })
    }
}

/// Query string of `GET /tasks/`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaskListQuery {
    /// Boolean-like: `true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`, `t`/`f`.
    /// Empty or absent means no importance filter.
    pub important: Option<String>,
}

/// Parse the `important` filter; an empty value counts as absent.
pub fn parse_important(raw: Option<&str>) -> TaskResult<Option<bool>> {
    let Some(raw) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };

    bool_from_str(raw)
        .map(Some)
        .ok_or_else(|| TaskError::field("important", "Must be a valid boolean."))
}
