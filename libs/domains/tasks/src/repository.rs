use async_trait::async_trait;
use chrono::Utc;
use sea_orm::DbErr;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::models::{
    Author, AuthoredComment, AuthoredTask, Comment, NewComment, NewTask, Task, TaskFilter,
    TaskWithComments,
};

/// Repository trait for task and comment persistence
///
/// "No match" is not an error here: lookups return `None` and deletes return
/// the number of rows removed. The service decides what a miss means.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Look up a user row by id
    async fn find_user(&self, id: Uuid) -> TaskResult<Option<Author>>;

    /// Published tasks, newest first, ties broken by title (store collation;
    /// the in-memory store compares case-folded titles)
    async fn list_public(&self, filter: TaskFilter) -> TaskResult<Vec<AuthoredTask>>;

    /// A published task with its author and comments
    async fn find_public_detail(&self, id: i64) -> TaskResult<Option<TaskWithComments>>;

    /// Any task, published or not
    async fn find_task(&self, id: i64) -> TaskResult<Option<Task>>;

    /// A task only if `author` wrote it
    async fn find_owned_task(&self, id: i64, author: Uuid) -> TaskResult<Option<Task>>;

    async fn create_task(&self, input: NewTask) -> TaskResult<Task>;

    /// Persist every field of `task` and stamp `date_add` with the current time
    async fn save_task(&self, task: Task) -> TaskResult<Task>;

    /// Delete a task (and its comments) if `author` wrote it
    async fn delete_owned_task(&self, id: i64, author: Uuid) -> TaskResult<u64>;

    async fn create_comment(&self, input: NewComment) -> TaskResult<Comment>;

    async fn delete_owned_comment(&self, id: i64, author: Uuid) -> TaskResult<u64>;
}

#[derive(Debug, Default)]
struct Store {
    users: HashMap<Uuid, Author>,
    tasks: BTreeMap<i64, Task>,
    comments: BTreeMap<i64, Comment>,
    last_task_id: i64,
    last_comment_id: i64,
}

impl Store {
    fn author(&self, id: Uuid) -> TaskResult<Author> {
        self.users.get(&id).cloned().ok_or_else(|| {
            TaskError::Database(DbErr::RecordNotFound(format!("users.id = {id}")))
        })
    }

    fn authored(&self, task: &Task) -> TaskResult<AuthoredTask> {
        Ok(AuthoredTask {
            task: task.clone(),
            author: self.author(task.author)?,
        })
    }
}

fn foreign_key_violation(constraint: &str) -> TaskError {
    TaskError::Database(DbErr::Custom(format!(
        "violates foreign key constraint \"{constraint}\""
    )))
}

/// In-memory implementation of TaskRepository (for development/testing)
///
/// Enforces the same referential rules as the schema: tasks and comments need
/// an existing author, comments need an existing task, deleting a task removes
/// its comments, and a user with tasks cannot be removed.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskRepository {
    store: Arc<RwLock<Store>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provision a user row, as the identity service would.
    pub async fn insert_user(&self, author: Author) {
        self.store.write().await.users.insert(author.id, author);
    }

    /// Remove a user, cascading to their comments.
    ///
    /// Fails while the user still authors any task.
    pub async fn remove_user(&self, id: Uuid) -> TaskResult<bool> {
        let mut store = self.store.write().await;
        if store.tasks.values().any(|t| t.author == id) {
            return Err(foreign_key_violation("fk_tasks_author"));
        }
        store.comments.retain(|_, c| c.author != id);
        Ok(store.users.remove(&id).is_some())
    }

    /// Store `task` exactly as given, keeping its id and `date_add`.
    pub async fn insert_task(&self, task: Task) -> TaskResult<Task> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&task.author) {
            return Err(foreign_key_violation("fk_tasks_author"));
        }
        store.last_task_id = store.last_task_id.max(task.id);
        store.tasks.insert(task.id, task.clone());
        Ok(task)
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn find_user(&self, id: Uuid) -> TaskResult<Option<Author>> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn list_public(&self, filter: TaskFilter) -> TaskResult<Vec<AuthoredTask>> {
        let store = self.store.read().await;

        let mut tasks: Vec<&Task> = store
            .tasks
            .values()
            .filter(|t| t.public)
            .filter(|t| filter.important.is_none_or(|important| t.important == important))
            .collect();

        // Case-folded first, so mixed-case titles sort close to a Postgres
        // locale collation; byte order only settles exact case variants.
        tasks.sort_by(|a, b| {
            b.date_add
                .cmp(&a.date_add)
                .then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
                .then_with(|| a.title.cmp(&b.title))
        });

        tasks.into_iter().map(|t| store.authored(t)).collect()
    }

    async fn find_public_detail(&self, id: i64) -> TaskResult<Option<TaskWithComments>> {
        let store = self.store.read().await;

        let Some(task) = store.tasks.get(&id).filter(|t| t.public) else {
            return Ok(None);
        };

        let mut comments: Vec<&Comment> =
            store.comments.values().filter(|c| c.task == id).collect();
        comments.sort_by(|a, b| a.date_add.cmp(&b.date_add).then(a.id.cmp(&b.id)));

        let comments = comments
            .into_iter()
            .map(|c| {
                Ok(AuthoredComment {
                    comment: c.clone(),
                    author: store.author(c.author)?,
                })
            })
            .collect::<TaskResult<Vec<_>>>()?;

        Ok(Some(TaskWithComments {
            task: task.clone(),
            author: store.author(task.author)?,
            comments,
        }))
    }

    async fn find_task(&self, id: i64) -> TaskResult<Option<Task>> {
        Ok(self.store.read().await.tasks.get(&id).cloned())
    }

    async fn find_owned_task(&self, id: i64, author: Uuid) -> TaskResult<Option<Task>> {
        let store = self.store.read().await;
        Ok(store.tasks.get(&id).filter(|t| t.author == author).cloned())
    }

    async fn create_task(&self, input: NewTask) -> TaskResult<Task> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&input.author) {
            return Err(foreign_key_violation("fk_tasks_author"));
        }

        store.last_task_id += 1;
        let task = Task {
            id: store.last_task_id,
            title: input.title,
            message: input.message,
            date_add: Utc::now(),
            public: input.public,
            important: input.important,
            author: input.author,
            status: input.status,
        };
        store.tasks.insert(task.id, task.clone());

        tracing::info!(task_id = task.id, "Created task");
        Ok(task)
    }

    async fn save_task(&self, mut task: Task) -> TaskResult<Task> {
        let mut store = self.store.write().await;

        let Some(slot) = store.tasks.get_mut(&task.id) else {
            return Err(TaskError::NotFound(task.id));
        };
        task.date_add = Utc::now();
        *slot = task.clone();

        tracing::info!(task_id = task.id, "Updated task");
        Ok(task)
    }

    async fn delete_owned_task(&self, id: i64, author: Uuid) -> TaskResult<u64> {
        let mut store = self.store.write().await;

        if !store.tasks.get(&id).is_some_and(|t| t.author == author) {
            return Ok(0);
        }
        store.tasks.remove(&id);
        store.comments.retain(|_, c| c.task != id);

        tracing::info!(task_id = id, "Deleted task");
        Ok(1)
    }

    async fn create_comment(&self, input: NewComment) -> TaskResult<Comment> {
        let mut store = self.store.write().await;

        if !store.users.contains_key(&input.author) {
            return Err(foreign_key_violation("fk_comments_author"));
        }
        if !store.tasks.contains_key(&input.task) {
            return Err(foreign_key_violation("fk_comments_task"));
        }

        store.last_comment_id += 1;
        let comment = Comment {
            id: store.last_comment_id,
            author: input.author,
            task: input.task,
            date_add: Utc::now(),
            message: input.message,
        };
        store.comments.insert(comment.id, comment.clone());

        tracing::info!(comment_id = comment.id, task_id = comment.task, "Created comment");
        Ok(comment)
    }

    async fn delete_owned_comment(&self, id: i64, author: Uuid) -> TaskResult<u64> {
        let mut store = self.store.write().await;

        if !store.comments.get(&id).is_some_and(|c| c.author == author) {
            return Ok(0);
        }
        store.comments.remove(&id);

        tracing::info!(comment_id = id, "Deleted comment");
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use chrono::{DateTime, TimeZone};

    fn author(username: &str) -> Author {
        Author {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{username}@example.com"),
            date_joined: Utc::now(),
        }
    }

    fn new_task(author: Uuid, title: &str) -> NewTask {
        NewTask {
            title: title.to_string(),
            message: String::new(),
            public: true,
            important: false,
            status: TaskStatus::Active,
            author,
        }
    }

    fn seeded(id: i64, author: Uuid, title: &str, date_add: DateTime<Utc>) -> Task {
        Task {
            id,
            title: title.to_string(),
            message: String::new(),
            date_add,
            public: true,
            important: false,
            author,
            status: TaskStatus::Active,
        }
    }

    async fn repo_with_user(username: &str) -> (InMemoryTaskRepository, Author) {
        let repo = InMemoryTaskRepository::new();
        let user = author(username);
        repo.insert_user(user.clone()).await;
        (repo, user)
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let (repo, alice) = repo_with_user("alice").await;

        let first = repo.create_task(new_task(alice.id, "a")).await.unwrap();
        let second = repo.create_task(new_task(alice.id, "b")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn test_create_requires_existing_author() {
        let repo = InMemoryTaskRepository::new();
        let result = repo.create_task(new_task(Uuid::new_v4(), "orphan")).await;
        assert!(matches!(result, Err(TaskError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_orders_by_date_desc_then_title() {
        let (repo, alice) = repo_with_user("alice").await;
        let early = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();

        repo.insert_task(seeded(1, alice.id, "zeta", early)).await.unwrap();
        repo.insert_task(seeded(2, alice.id, "beta", late)).await.unwrap();
        repo.insert_task(seeded(3, alice.id, "alpha", late)).await.unwrap();

        let titles: Vec<String> = repo
            .list_public(TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.task.title)
            .collect();

        assert_eq!(titles, ["alpha", "beta", "zeta"]);
    }

    #[tokio::test]
    async fn test_list_title_tiebreak_ignores_case() {
        let (repo, alice) = repo_with_user("alice").await;
        let same = Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap();

        repo.insert_task(seeded(1, alice.id, "Banana", same)).await.unwrap();
        repo.insert_task(seeded(2, alice.id, "apple", same)).await.unwrap();
        repo.insert_task(seeded(3, alice.id, "Яблоко", same)).await.unwrap();
        repo.insert_task(seeded(4, alice.id, "арбуз", same)).await.unwrap();

        let titles: Vec<String> = repo
            .list_public(TaskFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.task.title)
            .collect();

        assert_eq!(titles, ["apple", "Banana", "арбуз", "Яблоко"]);
    }

    #[tokio::test]
    async fn test_list_filters_private_and_importance() {
        let (repo, alice) = repo_with_user("alice").await;

        let mut private = new_task(alice.id, "private");
        private.public = false;
        repo.create_task(private).await.unwrap();

        let mut important = new_task(alice.id, "important");
        important.important = true;
        repo.create_task(important).await.unwrap();

        repo.create_task(new_task(alice.id, "plain")).await.unwrap();

        let all = repo.list_public(TaskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|t| t.task.public));

        let only_important = repo
            .list_public(TaskFilter {
                important: Some(true),
            })
            .await
            .unwrap();
        assert_eq!(only_important.len(), 1);
        assert_eq!(only_important[0].task.title, "important");
        assert_eq!(only_important[0].author.username, "alice");

        let unimportant = repo
            .list_public(TaskFilter {
                important: Some(false),
            })
            .await
            .unwrap();
        assert_eq!(unimportant.len(), 1);
        assert_eq!(unimportant[0].task.title, "plain");
    }

    #[tokio::test]
    async fn test_owned_lookup_hides_foreign_tasks() {
        let (repo, alice) = repo_with_user("alice").await;
        let bob = author("bob");
        repo.insert_user(bob.clone()).await;

        let task = repo.create_task(new_task(alice.id, "mine")).await.unwrap();

        assert!(repo.find_owned_task(task.id, alice.id).await.unwrap().is_some());
        assert!(repo.find_owned_task(task.id, bob.id).await.unwrap().is_none());
        assert_eq!(repo.delete_owned_task(task.id, bob.id).await.unwrap(), 0);
        assert!(repo.find_task(task.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_delete_task_cascades_to_comments() {
        let (repo, alice) = repo_with_user("alice").await;
        let task = repo.create_task(new_task(alice.id, "t")).await.unwrap();
        let comment = repo
            .create_comment(NewComment {
                author: alice.id,
                task: task.id,
                message: "hi".into(),
            })
            .await
            .unwrap();

        assert_eq!(repo.delete_owned_task(task.id, alice.id).await.unwrap(), 1);
        assert_eq!(repo.delete_owned_comment(comment.id, alice.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_remove_user_restricted_by_tasks() {
        let (repo, alice) = repo_with_user("alice").await;
        let task = repo.create_task(new_task(alice.id, "t")).await.unwrap();

        assert!(repo.remove_user(alice.id).await.is_err());

        repo.delete_owned_task(task.id, alice.id).await.unwrap();
        assert!(repo.remove_user(alice.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_commenter_cascades_to_their_comments() {
        let (repo, alice) = repo_with_user("alice").await;
        let bob = author("bob");
        repo.insert_user(bob.clone()).await;

        let task = repo.create_task(new_task(alice.id, "t")).await.unwrap();
        let comment = repo
            .create_comment(NewComment {
                author: bob.id,
                task: task.id,
                message: "from bob".into(),
            })
            .await
            .unwrap();

        assert!(repo.remove_user(bob.id).await.unwrap());

        assert_eq!(repo.delete_owned_comment(comment.id, bob.id).await.unwrap(), 0);
        let detail = repo.find_public_detail(task.id).await.unwrap().unwrap();
        assert!(detail.comments.is_empty());
        assert!(repo.find_user(bob.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_stamps_date_add() {
        let (repo, alice) = repo_with_user("alice").await;
        let old = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let task = repo.insert_task(seeded(7, alice.id, "old", old)).await.unwrap();

        let saved = repo.save_task(task).await.unwrap();
        assert!(saved.date_add > old);

        let next = repo.create_task(new_task(alice.id, "next")).await.unwrap();
        assert_eq!(next.id, 8);
    }

    #[tokio::test]
    async fn test_detail_orders_comments() {
        let (repo, alice) = repo_with_user("alice").await;
        let task = repo.create_task(new_task(alice.id, "t")).await.unwrap();
        for message in ["first", "second"] {
            repo.create_comment(NewComment {
                author: alice.id,
                task: task.id,
                message: message.into(),
            })
            .await
            .unwrap();
        }

        let detail = repo.find_public_detail(task.id).await.unwrap().unwrap();
        let messages: Vec<&str> = detail
            .comments
            .iter()
            .map(|c| c.comment.message.as_str())
            .collect();
        assert_eq!(messages, ["first", "second"]);
    }
}
