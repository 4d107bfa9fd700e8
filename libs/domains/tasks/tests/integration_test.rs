//! Integration tests for the tasks domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Queries, joins and ordering behave as on the production schema
//! - Foreign key rules (RESTRICT on task authors, CASCADE on comments) hold
//! - The `task_status` enum round-trips
//!
//! They need a Docker daemon: `cargo test -p domain_tasks -- --ignored`

use chrono::{TimeZone, Utc};
use domain_tasks::entity::task;
use domain_tasks::*;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseBackend, Statement};
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

async fn setup(test_name: &str) -> (TestDatabase, PgTaskRepository, TestDataBuilder, uuid::Uuid) {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name(test_name);
    let author = db
        .create_test_user(builder.user_id(), &builder.username("alice"))
        .await;
    let repo = PgTaskRepository::new(db.connection());
    (db, repo, builder, author)
}

fn new_task(author: uuid::Uuid, title: &str, public: bool, important: bool) -> NewTask {
    NewTask {
        title: title.to_string(),
        message: String::new(),
        public,
        important,
        status: TaskStatus::Active,
        author,
    }
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_create_and_find_task() {
    let (_db, repo, builder, author) = setup("create_and_find").await;

    let mut input = new_task(author, &builder.name("task", "main"), false, true);
    input.status = TaskStatus::Deferred;

    let created = repo.create_task(input.clone()).await.unwrap();
    assert!(created.id > 0);
    assert_eq!(created.status, TaskStatus::Deferred);

    let found = assert_some(repo.find_task(created.id).await.unwrap(), "task should exist");
    assert_eq!(found.title, input.title);
    assert_uuid_eq(found.author, author, "task author");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_public_filters_and_orders() {
    let (db, repo, builder, author) = setup("list_public").await;

    let same_time = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
    let earlier = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    for (title, public, important, date) in [
        ("bravo", true, true, same_time),
        ("alpha", true, false, same_time),
        ("zulu", true, true, earlier),
        ("hidden", false, true, same_time),
    ] {
        task::ActiveModel {
            title: Set(title.to_string()),
            message: Set(String::new()),
            date_add: Set(date.into()),
            public: Set(public),
            important: Set(important),
            author: Set(author),
            status: Set(TaskStatus::Active),
            ..Default::default()
        }
        .insert(&db.connection)
        .await
        .unwrap();
    }

    let all = repo.list_public(TaskFilter::default()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|t| t.task.title.as_str()).collect();
    assert_eq!(titles, ["alpha", "bravo", "zulu"]);
    assert_eq!(all[0].author.username, builder.username("alice"));

    let important = repo
        .list_public(TaskFilter {
            important: Some(true),
        })
        .await
        .unwrap();
    let titles: Vec<&str> = important.iter().map(|t| t.task.title.as_str()).collect();
    assert_eq!(titles, ["bravo", "zulu"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_public_detail_loads_comments_in_order() {
    let (db, repo, builder, author) = setup("detail_comments").await;
    let commenter = db
        .create_test_user(builder.other_user_id(0), &builder.username("bob"))
        .await;

    let task = repo
        .create_task(new_task(author, "published", true, false))
        .await
        .unwrap();
    for (who, message) in [(commenter, "first"), (author, "second")] {
        repo.create_comment(NewComment {
            author: who,
            task: task.id,
            message: message.to_string(),
        })
        .await
        .unwrap();
    }

    let detail = assert_some(
        repo.find_public_detail(task.id).await.unwrap(),
        "published task should be visible",
    );
    let messages: Vec<&str> = detail
        .comments
        .iter()
        .map(|c| c.comment.message.as_str())
        .collect();
    assert_eq!(messages, ["first", "second"]);
    assert_uuid_eq(detail.comments[0].author.id, commenter, "comment author");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_private_task_has_no_public_detail() {
    let (_db, repo, _builder, author) = setup("private_detail").await;

    let task = repo
        .create_task(new_task(author, "draft", false, false))
        .await
        .unwrap();

    assert!(repo.find_public_detail(task.id).await.unwrap().is_none());
    assert!(repo.find_task(task.id).await.unwrap().is_some());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_save_task_refreshes_date_add() {
    let (_db, repo, _builder, author) = setup("save_refreshes").await;

    let created = repo
        .create_task(new_task(author, "before", false, false))
        .await
        .unwrap();

    let mut changed = created.clone();
    changed.apply_changes(TaskChanges {
        title: Some("after".into()),
        status: Some(TaskStatus::Done),
        ..Default::default()
    });
    let saved = repo.save_task(changed).await.unwrap();

    assert_eq!(saved.title, "after");
    assert_eq!(saved.status, TaskStatus::Done);
    assert!(saved.date_add >= created.date_add);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_ownership_scoped_delete() {
    let (db, repo, builder, author) = setup("scoped_delete").await;
    let other = db
        .create_test_user(builder.other_user_id(0), &builder.username("bob"))
        .await;

    let task = repo
        .create_task(new_task(author, "mine", true, false))
        .await
        .unwrap();

    assert!(repo.find_owned_task(task.id, other).await.unwrap().is_none());
    assert_eq!(repo.delete_owned_task(task.id, other).await.unwrap(), 0);
    assert_eq!(repo.delete_owned_task(task.id, author).await.unwrap(), 1);
    assert_eq!(repo.delete_owned_task(task.id, author).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_deleting_task_cascades_to_comments() {
    let (_db, repo, _builder, author) = setup("cascade_comments").await;

    let task = repo
        .create_task(new_task(author, "t", true, false))
        .await
        .unwrap();
    let comment = repo
        .create_comment(NewComment {
            author,
            task: task.id,
            message: String::new(),
        })
        .await
        .unwrap();

    repo.delete_owned_task(task.id, author).await.unwrap();

    assert_eq!(repo.delete_owned_comment(comment.id, author).await.unwrap(), 0);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_user_with_tasks_cannot_be_deleted() {
    let (db, repo, _builder, author) = setup("restrict_author").await;

    repo.create_task(new_task(author, "t", false, false))
        .await
        .unwrap();

    let result = db
        .connection
        .execute_raw(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [sea_orm::Value::from(author)],
        ))
        .await;

    assert!(result.is_err(), "expected foreign key violation");
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_deleting_commenter_cascades_to_their_comments() {
    let (db, repo, builder, author) = setup("cascade_commenter").await;
    let commenter = db
        .create_test_user(builder.other_user_id(0), &builder.username("bob"))
        .await;

    let task = repo
        .create_task(new_task(author, "t", true, false))
        .await
        .unwrap();
    let comment = repo
        .create_comment(NewComment {
            author: commenter,
            task: task.id,
            message: "from bob".into(),
        })
        .await
        .unwrap();

    db.connection
        .execute_raw(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "DELETE FROM users WHERE id = $1",
            [sea_orm::Value::from(commenter)],
        ))
        .await
        .unwrap();

    let row = db
        .connection
        .query_one_raw(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            "SELECT COUNT(*) AS n FROM comments WHERE id = $1",
            [sea_orm::Value::from(comment.id)],
        ))
        .await
        .unwrap()
        .unwrap();
    let count: i64 = row.try_get("", "n").unwrap();
    assert_eq!(count, 0);

    let detail = assert_some(
        repo.find_public_detail(task.id).await.unwrap(),
        "task survives its commenter",
    );
    assert!(detail.comments.is_empty());
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_service_update_foreign_task_is_not_owned() {
    let (db, repo, builder, author) = setup("service_not_owned").await;
    let other = db
        .create_test_user(builder.other_user_id(0), &builder.username("bob"))
        .await;
    let service = TaskService::new(repo);

    let created = service
        .create_task(
            author,
            serializers::TaskEditorInput {
                title: Some("alice's".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = service
        .update_task(other, created.task.id, serializers::TaskPatchInput::default())
        .await;

    assert!(matches!(result, Err(TaskError::NotOwned { .. })));
}
