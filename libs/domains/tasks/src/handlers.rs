use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use axum_helpers::{
    AppError, AuditEvent, AuditOutcome, AuthUser, IdPath, JsonBody, JwtAuth, ValidatedJson,
    errors::responses::{
        BadRequestValidationResponse, InternalServerErrorResponse, NotFoundResponse,
        UnauthorizedResponse,
    },
    jwt_auth_middleware,
};
use serde_json::json;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::models::{TaskFilter, TaskStatus};
use crate::repository::TaskRepository;
use crate::serializers::{
    AuthorView, CommentAddInput, CommentCreated, CommentView, TaskDetail, TaskEditorInput,
    TaskEditorView, TaskListItem, TaskListQuery, TaskMini, TaskPatchInput, parse_important,
};
use crate::service::TaskService;

pub const TAG: &str = "tasks";

/// Name of the bearer security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "bearer_auth";

type SharedService<R> = Arc<TaskService<R>>;

/// OpenAPI documentation for the tasks API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_tasks,
        get_task,
        create_task,
        update_task,
        delete_task,
        add_comment,
        delete_comment,
    ),
    components(
        schemas(
            TaskListItem,
            TaskDetail,
            TaskEditorView,
            TaskEditorInput,
            TaskPatchInput,
            CommentAddInput,
            CommentCreated,
            CommentView,
            AuthorView,
            TaskMini,
            TaskStatus
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            UnauthorizedResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Tasks and their comments")
    )
)]
pub struct ApiDoc;

/// Create the tasks router.
///
/// Reads are public; every write goes through [`jwt_auth_middleware`].
pub fn router<R: TaskRepository + 'static>(service: TaskService<R>, auth: JwtAuth) -> Router {
    let shared_service = Arc::new(service);

    let protected = Router::new()
        .route("/task/add/", post(create_task))
        .route("/task/{id}/save/", patch(update_task))
        .route("/task/{id}/del/", delete(delete_task))
        .route("/comment/{id}/add/", post(add_comment))
        .route("/comment/{id}/del/", delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(auth, jwt_auth_middleware));

    Router::new()
        .route("/tasks/", get(list_tasks))
        .route("/task/{id}/", get(get_task))
        .merge(protected)
        .with_state(shared_service)
}

/// List published tasks
#[utoipa::path(
    get,
    path = "/tasks/",
    tag = TAG,
    params(TaskListQuery),
    responses(
        (status = 200, description = "Published tasks, newest first", body = Vec<TaskListItem>),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_tasks<R: TaskRepository>(
    State(service): State<SharedService<R>>,
    query: Result<Query<TaskListQuery>, QueryRejection>,
) -> Result<Json<Vec<TaskListItem>>, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let filter = TaskFilter {
        important: parse_important(query.important.as_deref())?,
    };

    let tasks = service.list_public_tasks(filter).await?;
    Ok(Json(tasks.into_iter().map(Into::into).collect()))
}

/// Get a published task with its comments
#[utoipa::path(
    get,
    path = "/task/{id}/",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    responses(
        (status = 200, description = "Task found", body = TaskDetail),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_task<R: TaskRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> Result<Json<TaskDetail>, AppError> {
    let task = service.get_public_task(id).await?;
    Ok(Json(task.into()))
}

/// Create a task authored by the requester
#[utoipa::path(
    post,
    path = "/task/add/",
    tag = TAG,
    request_body = TaskEditorInput,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Task created", body = TaskEditorView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_task<R: TaskRepository>(
    State(service): State<SharedService<R>>,
    user: AuthUser,
    headers: HeaderMap,
    ValidatedJson(input): ValidatedJson<TaskEditorInput>,
) -> Result<impl IntoResponse, AppError> {
    let created = service.create_task(user.user_id()?, input).await?;

    AuditEvent::new(
        Some(created.author.id.to_string()),
        "task.create",
        Some(format!("task:{}", created.task.id)),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .with_details(json!({
        "title": created.task.title,
        "public": created.task.public,
        "status": created.task.status,
    }))
    .log();

    Ok((StatusCode::CREATED, Json(TaskEditorView::from(created))))
}

/// Partially update a task the requester owns
#[utoipa::path(
    patch,
    path = "/task/{id}/save/",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    request_body = TaskPatchInput,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Task updated", body = TaskEditorView),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_task<R: TaskRepository>(
    State(service): State<SharedService<R>>,
    user: AuthUser,
    IdPath(id): IdPath,
    headers: HeaderMap,
    JsonBody(input): JsonBody<TaskPatchInput>,
) -> Result<Json<TaskEditorView>, AppError> {
    let updated = service.update_task(user.user_id()?, id, input).await?;

    AuditEvent::new(
        Some(updated.author.id.to_string()),
        "task.update",
        Some(format!("task:{id}")),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .log();

    Ok(Json(updated.into()))
}

/// Delete a task the requester owns
///
/// Answers 204 whether or not anything was deleted.
#[utoipa::path(
    delete,
    path = "/task/{id}/del/",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Task ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Task deleted or not owned"),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_task<R: TaskRepository>(
    State(service): State<SharedService<R>>,
    user: AuthUser,
    IdPath(id): IdPath,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let user_id = user.user_id()?;
    let rows_affected = service.delete_task(user_id, id).await?;

    AuditEvent::new(
        Some(user_id.to_string()),
        "task.delete",
        Some(format!("task:{id}")),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .with_details(json!({ "rows_affected": rows_affected }))
    .log();

    Ok(StatusCode::NO_CONTENT)
}

/// Comment on a task
#[utoipa::path(
    post,
    path = "/comment/{id}/add/",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "ID of the task being commented on")
    ),
    request_body = CommentAddInput,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Comment created", body = CommentCreated),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn add_comment<R: TaskRepository>(
    State(service): State<SharedService<R>>,
    user: AuthUser,
    IdPath(task_id): IdPath,
    headers: HeaderMap,
    JsonBody(input): JsonBody<CommentAddInput>,
) -> Result<impl IntoResponse, AppError> {
    let (comment, task) = service.add_comment(user.user_id()?, task_id, input).await?;

    AuditEvent::new(
        Some(comment.author.id.to_string()),
        "comment.create",
        Some(format!("comment:{}", comment.comment.id)),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .with_details(json!({ "task_id": task.id }))
    .log();

    let body = CommentCreated::new(comment.comment, comment.author, &task);
    Ok((StatusCode::CREATED, Json(body)))
}

/// Delete a comment the requester wrote
#[utoipa::path(
    delete,
    path = "/comment/{id}/del/",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Comment ID")
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Comment deleted or not owned"),
        (status = 401, response = UnauthorizedResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_comment<R: TaskRepository>(
    State(service): State<SharedService<R>>,
    user: AuthUser,
    IdPath(id): IdPath,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let user_id = user.user_id()?;
    let rows_affected = service.delete_comment(user_id, id).await?;

    AuditEvent::new(
        Some(user_id.to_string()),
        "comment.delete",
        Some(format!("comment:{id}")),
        AuditOutcome::Success,
    )
    .with_request_headers(&headers)
    .with_details(json!({ "rows_affected": rows_affected }))
    .log();

    Ok(StatusCode::NO_CONTENT)
}
