//! Plans applied to a real SQLite database.

mod common;

use common::{column_names, create_test_pool, index_exists, table_exists, text, varchar};
use oxide_alter::error::AlterError;
use oxide_alter::prelude::*;

fn id() -> ColumnOptions {
    ColumnOptions::new(ColumnType::Integer)
        .not_null()
        .auto_increment()
}

async fn create_notes(executor: &SqliteExecutor) -> TablePlanner<SqliteDialect> {
    let mut planner = TablePlanner::new("notes", SqliteDialect::new());
    planner.add_column("id", id(), None).unwrap();
    planner.add_column("title", varchar(200).not_null(), None).unwrap();
    planner.add_column("body", text(), None).unwrap();
    planner.set_primary_key(["id"]).unwrap();
    planner
        .add_index("idx_title", IndexOptions::on(["title"]))
        .unwrap();

    let operations = planner.execute(executor).await.unwrap();
    assert_eq!(operations.len(), 2);
    planner
}

#[tokio::test]
async fn create_table_with_deferred_index() {
    let pool = create_test_pool().await;
    let executor = SqliteExecutor::new(pool.clone());

    let planner = create_notes(&executor).await;

    assert!(planner.exists());
    assert!(table_exists(&pool, "notes").await);
    assert!(index_exists(&pool, "idx_title").await);
    assert_eq!(column_names(&pool, "notes").await, vec!["id", "title", "body"]);
}

#[tokio::test]
async fn rename_add_and_drop_columns() {
    let pool = create_test_pool().await;
    let executor = SqliteExecutor::new(pool.clone());
    let mut planner = create_notes(&executor).await;

    planner
        .change_column("body", ColumnOptions::default(), Some("content".to_string()), None)
        .unwrap();
    planner.add_column("author", varchar(80), None).unwrap();
    planner.drop_index("idx_title").unwrap();
    planner.drop_column("title").unwrap();

    let operations = planner.execute(&executor).await.unwrap();

    assert_eq!(operations.len(), 4);
    assert!(!index_exists(&pool, "idx_title").await);
    assert_eq!(
        column_names(&pool, "notes").await,
        vec!["id", "content", "author"]
    );
    assert!(planner.plan().unwrap().is_empty());
}

#[tokio::test]
async fn rename_and_drop_table() {
    let pool = create_test_pool().await;
    let executor = SqliteExecutor::new(pool.clone());
    let mut planner = create_notes(&executor).await;

    planner.rename_table("memos").unwrap();
    planner.execute(&executor).await.unwrap();
    assert!(!table_exists(&pool, "notes").await);
    assert!(table_exists(&pool, "memos").await);

    planner.drop().unwrap();
    let operations = planner.execute(&executor).await.unwrap();
    assert_eq!(operations.len(), 1);
    assert!(!table_exists(&pool, "memos").await);
    assert!(!planner.exists());
}

#[tokio::test]
async fn rejected_plan_touches_nothing() {
    let pool = create_test_pool().await;
    let executor = SqliteExecutor::new(pool.clone());
    let mut planner = create_notes(&executor).await;

    planner.add_column("author", varchar(80), None).unwrap();
    planner
        .change_column("title", varchar(300), None, None)
        .unwrap();

    let result = planner.execute(&executor).await;

    assert!(matches!(
        result,
        Err(AlterError::UnsupportedOperation { entity, .. }) if entity == "title"
    ));
    assert_eq!(column_names(&pool, "notes").await, vec!["id", "title", "body"]);
    assert!(planner.original().unwrap().get_column("author").is_none());
}

#[tokio::test]
async fn failed_statement_rolls_back_and_keeps_pending_state() {
    let pool = create_test_pool().await;
    let executor = SqliteExecutor::new(pool.clone());
    let mut planner = create_notes(&executor).await;

    // SQLite refuses to add a NOT NULL column without a default.
    planner.add_column("author", varchar(80), None).unwrap();
    planner
        .add_column("rating", ColumnOptions::new(ColumnType::Integer).not_null(), None)
        .unwrap();

    let result = planner.execute(&executor).await;

    assert!(matches!(result, Err(AlterError::Database(_))));
    assert_eq!(column_names(&pool, "notes").await, vec!["id", "title", "body"]);
    assert!(planner.original().unwrap().get_column("author").is_none());
    assert_eq!(planner.plan().unwrap().len(), 2);
}

#[tokio::test]
async fn dry_run_leaves_database_untouched() {
    let pool = create_test_pool().await;
    let executor = SqliteExecutor::new(pool.clone()).dry_run(true);

    let mut planner = TablePlanner::new("notes", SqliteDialect::new());
    planner.add_column("id", id(), None).unwrap();
    let operations = planner.execute(&executor).await.unwrap();

    assert_eq!(operations.len(), 1);
    assert!(!table_exists(&pool, "notes").await);
    assert!(!planner.exists());
    assert!(matches!(
        &planner.plan().unwrap()[..],
        [Operation::CreateTable(op)] if op.table == "notes"
    ));
}
