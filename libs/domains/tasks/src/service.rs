use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::models::{Author, AuthoredComment, AuthoredTask, Comment, Task, TaskFilter, TaskWithComments};
use crate::repository::TaskRepository;
use crate::serializers::{CommentAddInput, TaskEditorInput, TaskPatchInput};

/// Service layer for task and comment business logic
///
/// Mutating operations take the requester's user id from the verified token
/// and resolve it to a user row first; ownership is always taken from that
/// row, never from the request body.
#[derive(Clone)]
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Resolve a token subject to a user; unknown users are unauthenticated.
    pub async fn resolve_requester(&self, user_id: Uuid) -> TaskResult<Author> {
        self.repository
            .find_user(user_id)
            .await?
            .ok_or(TaskError::Unauthenticated(user_id))
    }

    /// Published tasks, optionally narrowed by importance
    pub async fn list_public_tasks(&self, filter: TaskFilter) -> TaskResult<Vec<AuthoredTask>> {
        self.repository.list_public(filter).await
    }

    /// A published task with its comments
    pub async fn get_public_task(&self, id: i64) -> TaskResult<TaskWithComments> {
        self.repository
            .find_public_detail(id)
            .await?
            .ok_or(TaskError::PublishedNotFound(id))
    }

    pub async fn create_task(
        &self,
        requester: Uuid,
        input: TaskEditorInput,
    ) -> TaskResult<AuthoredTask> {
        let author = self.resolve_requester(requester).await?;

        input.validate()?;
        let task = self
            .repository
            .create_task(input.into_new_task(author.id)?)
            .await?;

        Ok(AuthoredTask { task, author })
    }

    /// Partially update a task the requester owns.
    ///
    /// A task owned by someone else is reported exactly like a missing one.
    pub async fn update_task(
        &self,
        requester: Uuid,
        id: i64,
        input: TaskPatchInput,
    ) -> TaskResult<AuthoredTask> {
        let author = self.resolve_requester(requester).await?;

        let mut task = self
            .repository
            .find_owned_task(id, author.id)
            .await?
            .ok_or_else(|| TaskError::NotOwned {
                id,
                username: author.username.clone(),
            })?;

        input.validate()?;
        task.apply_changes(input.into_changes()?);

        let task = self.repository.save_task(task).await?;
        Ok(AuthoredTask { task, author })
    }

    /// Delete a task the requester owns; returns the number of rows removed.
    pub async fn delete_task(&self, requester: Uuid, id: i64) -> TaskResult<u64> {
        let author = self.resolve_requester(requester).await?;
        self.repository.delete_owned_task(id, author.id).await
    }

    /// Comment on any existing task, published or not.
    pub async fn add_comment(
        &self,
        requester: Uuid,
        task_id: i64,
        input: CommentAddInput,
    ) -> TaskResult<(AuthoredComment, Task)> {
        let author = self.resolve_requester(requester).await?;

        let task = self
            .repository
            .find_task(task_id)
            .await?
            .ok_or(TaskError::NotFound(task_id))?;

        input.validate()?;
        let comment: Comment = self
            .repository
            .create_comment(input.into_new_comment(author.id, task.id)?)
            .await?;

        Ok((AuthoredComment { comment, author }, task))
    }

    /// Delete a comment the requester wrote; returns the number of rows removed.
    pub async fn delete_comment(&self, requester: Uuid, id: i64) -> TaskResult<u64> {
        let author = self.resolve_requester(requester).await?;
        self.repository.delete_owned_comment(id, author.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTask, TaskStatus};
    use crate::repository::MockTaskRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn author(username: &str) -> Author {
        Author {
            id: Uuid::now_v7(),
            username: username.to_string(),
            email: String::new(),
            date_joined: Utc::now(),
        }
    }

    fn task(id: i64, author: Uuid) -> Task {
        Task {
            id,
            title: "Buy milk".into(),
            message: String::new(),
            date_add: Utc::now(),
            public: false,
            important: false,
            author,
            status: TaskStatus::Active,
        }
    }

    fn expect_user(mock: &mut MockTaskRepository, user: &Author) {
        let user = user.clone();
        mock.expect_find_user()
            .with(eq(user.id))
            .returning(move |_| Ok(Some(user.clone())));
    }

    #[tokio::test]
    async fn test_unknown_requester_is_unauthenticated() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo.expect_find_user().returning(|_| Ok(None));
        mock_repo.expect_delete_owned_task().never();

        let service = TaskService::new(mock_repo);
        let result = service.delete_task(Uuid::now_v7(), 1).await;

        assert!(matches!(result, Err(TaskError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_create_task_sets_author_from_requester() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        expect_user(&mut mock_repo, &alice);

        let alice_id = alice.id;
        mock_repo
            .expect_create_task()
            .withf(move |input: &NewTask| input.author == alice_id && input.title == "Buy milk")
            .returning(|input| {
                Ok(Task {
                    id: 1,
                    title: input.title,
                    message: input.message,
                    date_add: Utc::now(),
                    public: input.public,
                    important: input.important,
                    author: input.author,
                    status: input.status,
                })
            });

        let service = TaskService::new(mock_repo);
        let created = service
            .create_task(
                alice.id,
                TaskEditorInput {
                    title: Some("Buy milk".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(created.author.username, "alice");
        assert_eq!(created.task.author, alice.id);
        assert!(!created.task.public);
    }

    #[tokio::test]
    async fn test_create_task_validation_skips_repository() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        expect_user(&mut mock_repo, &alice);
        mock_repo.expect_create_task().never();

        let service = TaskService::new(mock_repo);
        let result = service
            .create_task(
                alice.id,
                TaskEditorInput {
                    title: Some("".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(TaskError::Validation(ref f)) if f.contains_key("title")));
    }

    #[tokio::test]
    async fn test_update_foreign_task_is_not_found() {
        let mut mock_repo = MockTaskRepository::new();
        let bob = author("bob");
        expect_user(&mut mock_repo, &bob);
        mock_repo
            .expect_find_owned_task()
            .with(eq(7), eq(bob.id))
            .returning(|_, _| Ok(None));
        mock_repo.expect_save_task().never();

        let service = TaskService::new(mock_repo);
        let err = service
            .update_task(bob.id, 7, TaskPatchInput::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Task with id=7 for user bob not found");
    }

    #[tokio::test]
    async fn test_update_applies_only_present_fields() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        expect_user(&mut mock_repo, &alice);

        let existing = task(3, alice.id);
        mock_repo
            .expect_find_owned_task()
            .returning(move |_, _| Ok(Some(existing.clone())));
        mock_repo
            .expect_save_task()
            .withf(|t: &Task| t.public && t.title == "Buy milk" && t.status == TaskStatus::Done)
            .returning(Ok);

        let service = TaskService::new(mock_repo);
        let updated = service
            .update_task(
                alice.id,
                3,
                TaskPatchInput {
                    public: Some(true.into()),
                    status: Some("done".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.task.public);
        assert_eq!(updated.task.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_update_invalid_status_is_field_error() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        expect_user(&mut mock_repo, &alice);

        let existing = task(3, alice.id);
        mock_repo
            .expect_find_owned_task()
            .returning(move |_, _| Ok(Some(existing.clone())));
        mock_repo.expect_save_task().never();

        let service = TaskService::new(mock_repo);
        let result = service
            .update_task(
                alice.id,
                3,
                TaskPatchInput {
                    status: Some("archived".into()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(TaskError::Validation(ref f)) if f.contains_key("status")));
    }

    #[tokio::test]
    async fn test_get_private_task_is_not_found() {
        let mut mock_repo = MockTaskRepository::new();
        mock_repo
            .expect_find_public_detail()
            .with(eq(12))
            .returning(|_| Ok(None));

        let service = TaskService::new(mock_repo);
        let err = service.get_public_task(12).await.unwrap_err();

        assert_eq!(err.to_string(), "Published task with id=12 not found");
    }

    #[tokio::test]
    async fn test_comment_on_missing_task_is_not_found() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        expect_user(&mut mock_repo, &alice);
        mock_repo.expect_find_task().returning(|_| Ok(None));
        mock_repo.expect_create_comment().never();

        let service = TaskService::new(mock_repo);
        let result = service
            .add_comment(alice.id, 99, CommentAddInput::default())
            .await;

        assert!(matches!(result, Err(TaskError::NotFound(99))));
    }

    #[tokio::test]
    async fn test_comment_on_private_task_allowed() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        let bob = author("bob");
        expect_user(&mut mock_repo, &bob);

        let private = task(4, alice.id);
        mock_repo
            .expect_find_task()
            .returning(move |_| Ok(Some(private.clone())));
        mock_repo.expect_create_comment().returning(|input| {
            Ok(Comment {
                id: 1,
                author: input.author,
                task: input.task,
                date_add: Utc::now(),
                message: input.message,
            })
        });

        let service = TaskService::new(mock_repo);
        let (comment, task) = service
            .add_comment(bob.id, 4, CommentAddInput { message: None })
            .await
            .unwrap();

        assert_eq!(comment.comment.author, bob.id);
        assert_eq!(comment.comment.task, 4);
        assert_eq!(comment.comment.message, "");
        assert_eq!(task.author, alice.id);
    }

    #[tokio::test]
    async fn test_comment_with_null_message_is_rejected() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        expect_user(&mut mock_repo, &alice);

        let existing = task(4, alice.id);
        mock_repo
            .expect_find_task()
            .returning(move |_| Ok(Some(existing.clone())));
        mock_repo.expect_create_comment().never();

        let service = TaskService::new(mock_repo);
        let result = service
            .add_comment(
                alice.id,
                4,
                CommentAddInput {
                    message: Some(serde_json::Value::Null),
                },
            )
            .await;

        match result {
            Err(TaskError::Validation(fields)) => {
                assert_eq!(fields["message"], vec!["This field may not be null."]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_comment_is_scoped_to_requester() {
        let mut mock_repo = MockTaskRepository::new();
        let alice = author("alice");
        expect_user(&mut mock_repo, &alice);
        mock_repo
            .expect_delete_owned_comment()
            .with(eq(999), eq(alice.id))
            .returning(|_, _| Ok(0));

        let service = TaskService::new(mock_repo);
        assert_eq!(service.delete_comment(alice.id, 999).await.unwrap(), 0);
    }
}
