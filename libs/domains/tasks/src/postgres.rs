use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder,
};
use uuid::Uuid;

use crate::{
    entity::{comment, task, user},
    error::{TaskError, TaskResult},
    models::{
        Author, AuthoredComment, AuthoredTask, Comment, NewComment, NewTask, Task, TaskFilter,
        TaskWithComments,
    },
    repository::TaskRepository,
};

/// PostgreSQL implementation of [`TaskRepository`]
#[derive(Clone)]
pub struct PgTaskRepository {
    db: DatabaseConnection,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// The FKs guarantee an author row; a miss means the join itself is broken
fn require_author(author: Option<user::Model>, owner: Uuid) -> TaskResult<Author> {
    author
        .map(Into::into)
        .ok_or_else(|| TaskError::Database(DbErr::RecordNotFound(format!("users.id = {owner}"))))
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn find_user(&self, id: Uuid) -> TaskResult<Option<Author>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn list_public(&self, filter: TaskFilter) -> TaskResult<Vec<AuthoredTask>> {
        let mut query = task::Entity::find().filter(task::Column::Public.eq(true));

        if let Some(important) = filter.important {
            query = query.filter(task::Column::Important.eq(important));
        }

        let rows = query
            .order_by_desc(task::Column::DateAdd)
            .order_by_asc(task::Column::Title)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?;

        rows.into_iter()
            .map(|(model, author)| {
                let author = require_author(author, model.author)?;
                Ok(AuthoredTask {
                    task: model.into(),
                    author,
                })
            })
            .collect()
    }

    async fn find_public_detail(&self, id: i64) -> TaskResult<Option<TaskWithComments>> {
        let Some((model, author)) = task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::Public.eq(true))
            .find_also_related(user::Entity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let author = require_author(author, model.author)?;

        let comments = comment::Entity::find()
            .filter(comment::Column::Task.eq(id))
            .order_by_asc(comment::Column::DateAdd)
            .order_by_asc(comment::Column::Id)
            .find_also_related(user::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|(comment, author)| {
                let author = require_author(author, comment.author)?;
                Ok(AuthoredComment {
                    comment: comment.into(),
                    author,
                })
            })
            .collect::<TaskResult<Vec<_>>>()?;

        Ok(Some(TaskWithComments {
            task: model.into(),
            author,
            comments,
        }))
    }

    async fn find_task(&self, id: i64) -> TaskResult<Option<Task>> {
        let model = task::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_owned_task(&self, id: i64, author: Uuid) -> TaskResult<Option<Task>> {
        let model = task::Entity::find()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::Author.eq(author))
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }

    async fn create_task(&self, input: NewTask) -> TaskResult<Task> {
        let active_model: task::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(task_id = model.id, "Created task");
        Ok(model.into())
    }

    async fn save_task(&self, task: Task) -> TaskResult<Task> {
        let id = task.id;
        let active_model: task::ActiveModel = task.into();

        let model = match active_model.update(&self.db).await {
            Ok(model) => model,
            // Deleted between lookup and save
            Err(DbErr::RecordNotUpdated) => return Err(TaskError::NotFound(id)),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(task_id = id, "Updated task");
        Ok(model.into())
    }

    async fn delete_owned_task(&self, id: i64, author: Uuid) -> TaskResult<u64> {
        let result = task::Entity::delete_many()
            .filter(task::Column::Id.eq(id))
            .filter(task::Column::Author.eq(author))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(task_id = id, "Deleted task");
        }
        Ok(result.rows_affected)
    }

    async fn create_comment(&self, input: NewComment) -> TaskResult<Comment> {
        let active_model: comment::ActiveModel = input.into();
        let model = active_model.insert(&self.db).await?;

        tracing::info!(comment_id = model.id, task_id = model.task, "Created comment");
        Ok(model.into())
    }

    async fn delete_owned_comment(&self, id: i64, author: Uuid) -> TaskResult<u64> {
        let result = comment::Entity::delete_many()
            .filter(comment::Column::Id.eq(id))
            .filter(comment::Column::Author.eq(author))
            .exec(&self.db)
            .await?;

        if result.rows_affected > 0 {
            tracing::info!(comment_id = id, "Deleted comment");
        }
        Ok(result.rows_affected)
    }
}
