#![cfg(feature = "pg-tests")]

use issuetracker::config;
use issuetracker::model::{IssueFilter, IssueId, IssuePatch, NewIssue};
use issuetracker::store::postgres::PostgresStore;
use issuetracker::store::{IssueStore, StoreError};
use serial_test::serial;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

static PG_STORE: tokio::sync::OnceCell<Arc<PostgresStore>> = tokio::sync::OnceCell::const_new();

fn database_url() -> Option<String> {
    std::env::var("ISSUES_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("ISSUES_POSTGRES_URL"))
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
}

fn pg_config(url: String) -> config::PostgresConfig {
    config::PostgresConfig {
        url,
        max_connections: 5,
        connect_timeout_ms: 5_000,
        acquire_timeout_ms: 5_000,
    }
}

async fn reset_postgres(url: &str) -> Result<(), sqlx::Error> {
    let pool = match tokio::time::timeout(
        std::time::Duration::from_secs(2),
        PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(std::time::Duration::from_secs(2))
            .connect(url),
    )
    .await
    {
        Ok(result) => result?,
        Err(_) => return Err(sqlx::Error::PoolTimedOut),
    };
    sqlx::query("TRUNCATE issues RESTART IDENTITY")
        .execute(&pool)
        .await
        .map(|_| ())
}

async fn pg_store() -> Option<Arc<PostgresStore>> {
    let Some(url) = database_url() else {
        eprintln!("skipping pg-tests: set ISSUES_TEST_DATABASE_URL or DATABASE_URL");
        return None;
    };
    let store = match PG_STORE
        .get_or_try_init(|| async {
            let store = PostgresStore::connect(&pg_config(url.clone())).await?;
            Ok::<_, StoreError>(Arc::new(store))
        })
        .await
    {
        Ok(store) => Arc::clone(store),
        Err(err) => {
            eprintln!("skipping pg-tests: connect postgres store failed: {err}");
            return None;
        }
    };
    if let Err(err) = reset_postgres(&url).await {
        eprintln!("skipping pg-tests: cannot reset postgres: {err}");
        return None;
    }
    Some(store)
}

fn new_issue(title: &str, assigned_to: &str) -> NewIssue {
    NewIssue {
        issue_title: title.to_string(),
        issue_text: "text".to_string(),
        created_by: "me".to_string(),
        assigned_to: assigned_to.to_string(),
        status_text: String::new(),
        open: true,
    }
}

fn by_id(id: &IssueId) -> IssueFilter {
    IssueFilter {
        id: Some(*id),
        ..IssueFilter::default()
    }
}

#[tokio::test]
#[serial]
async fn pg_issue_lifecycle() {
    let Some(store) = pg_store().await else {
        return;
    };
    assert!(store.is_durable());
    assert_eq!(store.backend_name(), "postgres");
    store.health_check().await.expect("healthy");

    let created = store
        .create_issue("apitest", new_issue("first", "bob"))
        .await
        .expect("create");
    assert_eq!(created.created_on, created.updated_on);
    let fetched = store
        .list_issues("apitest", &by_id(&created.id))
        .await
        .expect("list by id");
    assert_eq!(fetched, vec![created.clone()]);

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let updated = store
        .update_issue(
            "apitest",
            &created.id,
            IssuePatch {
                open: Some(false),
                status_text: Some("closed".to_string()),
                ..IssuePatch::default()
            },
        )
        .await
        .expect("update");
    assert!(!updated.open);
    assert_eq!(updated.status_text, "closed");
    assert_eq!(updated.created_on, created.created_on);
    assert!(updated.updated_on > created.updated_on);

    store
        .delete_issue("apitest", &created.id)
        .await
        .expect("delete");
    let err = store
        .delete_issue("apitest", &created.id)
        .await
        .expect_err("already deleted");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn pg_list_filters_and_project_scope() {
    let Some(store) = pg_store().await else {
        return;
    };
    let first = store
        .create_issue("alpha", new_issue("first", "bob"))
        .await
        .expect("first");
    let second = store
        .create_issue("alpha", new_issue("second", "ann"))
        .await
        .expect("second");
    store
        .create_issue("beta", new_issue("other", "bob"))
        .await
        .expect("other project");

    let all = store
        .list_issues("alpha", &IssueFilter::default())
        .await
        .expect("list");
    assert_eq!(all, vec![first.clone(), second.clone()]);

    let bob = IssueFilter {
        assigned_to: Some("bob".to_string()),
        ..IssueFilter::default()
    };
    let filtered = store.list_issues("alpha", &bob).await.expect("filtered");
    assert_eq!(filtered, vec![first.clone()]);

    let by_created = IssueFilter {
        created_on: Some(second.created_on),
        ..IssueFilter::default()
    };
    let filtered = store
        .list_issues("alpha", &by_created)
        .await
        .expect("by created_on");
    assert!(filtered.contains(&second));

    let hidden = store
        .list_issues("beta", &by_id(&first.id))
        .await
        .expect("other project");
    assert!(hidden.is_empty());
    let err = store
        .update_issue(
            "beta",
            &first.id,
            IssuePatch {
                issue_title: Some("stolen".to_string()),
                ..IssuePatch::default()
            },
        )
        .await
        .expect_err("other project");
    assert!(matches!(err, StoreError::NotFound(_)));
    let err = store
        .delete_issue("alpha", &IssueId::generate())
        .await
        .expect_err("unknown id");
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn pg_connect_without_migrations_uses_existing_schema() {
    let Some(store) = pg_store().await else {
        return;
    };
    let created = store
        .create_issue("apitest", new_issue("shared", ""))
        .await
        .expect("create");
    let url = database_url().expect("url");
    let plain = PostgresStore::connect_without_migrations(&pg_config(url))
        .await
        .expect("connect");
    let listed = plain
        .list_issues("apitest", &IssueFilter::default())
        .await
        .expect("list");
    assert_eq!(listed, vec![created]);
}
