//! Request and snapshot files, as the CLI reads and writes them.

mod common;

use std::fs;

use common::{column_names, create_test_pool, users};
use oxide_alter::error::AlterError;
use oxide_alter::prelude::*;
use tempfile::TempDir;

const ADD_EMAIL: &str = r#"{
    "table": "users",
    "changes": [
        { "op": "add_column", "name": "email",
          "options": { "type": "varchar", "length": 255 } },
        { "op": "change_column", "name": "name", "new_name": "display_name" },
        { "op": "add_index", "name": "idx_email", "options": { "columns": ["email"] } }
    ]
}"#;

#[test]
fn request_file_plans_against_snapshot_file() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("schema.json");
    let request = dir.path().join("add_email.json");
    SchemaSnapshot::new().table(users()).save(&schema).unwrap();
    fs::write(&request, ADD_EMAIL).unwrap();

    let snapshot = SchemaSnapshot::load(&schema).unwrap();
    let request = AlterRequest::load(&request).unwrap();
    let planner = request.planner(&snapshot, SqliteDialect::new()).unwrap();

    let operations = planner.plan().unwrap();
    assert_eq!(
        common::descriptions(&operations),
        vec![
            "Change column 'name' to 'display_name' in table 'users'",
            "Add column 'email' to table 'users'",
            "Add index 'idx_email' to table 'users'",
        ]
    );
}

#[test]
fn request_without_table_is_rejected() {
    let dir = TempDir::new().unwrap();
    let request = dir.path().join("bad.json");
    fs::write(&request, r#"{ "table": "", "changes": [] }"#).unwrap();

    assert!(matches!(
        AlterRequest::load(&request),
        Err(AlterError::InvalidRequest(_))
    ));
}

#[test]
fn malformed_request_is_a_serialization_error() {
    let dir = TempDir::new().unwrap();
    let request = dir.path().join("bad.json");
    fs::write(
        &request,
        r#"{ "table": "users", "changes": [ { "op": "truncate" } ] }"#,
    )
    .unwrap();

    assert!(matches!(
        AlterRequest::load(&request),
        Err(AlterError::Serialization(_))
    ));
}

#[test]
fn request_for_new_table() {
    let request: AlterRequest = serde_json::from_str(
        r#"{
            "table": "tags",
            "changes": [
                { "op": "add_column", "name": "id",
                  "options": { "type": "integer", "nullable": false, "auto_increment": true } },
                { "op": "add_column", "name": "label", "options": { "type": "text" } },
                { "op": "set_primary_key", "columns": ["id"] }
            ]
        }"#,
    )
    .unwrap();

    let planner = request
        .planner(&SchemaSnapshot::new(), MysqlDialect::new())
        .unwrap();
    let operations = planner.plan().unwrap();

    assert!(matches!(
        &operations[..],
        [Operation::CreateTable(op)] if op.columns.len() == 2 && op.indexes.len() == 1
    ));
}

#[tokio::test]
async fn applied_request_updates_snapshot() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("schema.json");

    let pool = create_test_pool().await;
    let executor = SqliteExecutor::new(pool.clone());

    // Create the table from an empty snapshot first.
    let mut snapshot = SchemaSnapshot::new();
    let create = AlterRequest::new("users")
        .change(Mutation::AddColumn {
            name: "id".to_string(),
            options: ColumnOptions::new(ColumnType::Integer)
                .not_null()
                .auto_increment(),
            position: None,
        })
        .change(Mutation::AddColumn {
            name: "name".to_string(),
            options: ColumnOptions::new(ColumnType::Varchar).length(80),
            position: None,
        })
        .change(Mutation::SetPrimaryKey {
            columns: vec!["id".to_string()],
        });
    let mut planner = create.planner(&snapshot, SqliteDialect::new()).unwrap();
    planner.execute(&executor).await.unwrap();
    snapshot.replace_table(&create.table, planner.original().cloned());
    snapshot.save(&schema).unwrap();

    // Then alter it through a request file.
    let request: AlterRequest = serde_json::from_str(ADD_EMAIL).unwrap();
    let snapshot = SchemaSnapshot::load(&schema).unwrap();
    let mut planner = request.planner(&snapshot, SqliteDialect::new()).unwrap();
    let operations = planner.execute(&executor).await.unwrap();
    assert_eq!(operations.len(), 3);

    let mut snapshot = snapshot;
    snapshot.replace_table(&request.table, planner.original().cloned());
    snapshot.save(&schema).unwrap();

    let saved = SchemaSnapshot::load(&schema).unwrap();
    let users = saved.get_table("users").unwrap();
    assert_eq!(
        users.column_names().collect::<Vec<_>>(),
        vec!["id", "display_name", "email"]
    );
    assert!(users.get_index("idx_email").is_some());
    assert_eq!(
        column_names(&pool, "users").await,
        vec!["id", "display_name", "email"]
    );
}
