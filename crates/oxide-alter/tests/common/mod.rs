#![allow(dead_code)]

use oxide_alter::prelude::*;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub fn int() -> ColumnOptions {
    ColumnOptions::new(ColumnType::Integer).length(11).not_null()
}

pub fn varchar(length: u32) -> ColumnOptions {
    ColumnOptions::new(ColumnType::Varchar).length(length)
}

pub fn text() -> ColumnOptions {
    ColumnOptions::new(ColumnType::Text)
}

/// `users (id, name)` with a primary key on `id`.
pub fn users() -> Table {
    Table::new("users")
        .column(Column::new("id", int()))
        .column(Column::new("name", varchar(80)))
        .index(Index::new(PRIMARY_KEY, IndexOptions::on(["id"])))
}

/// `posts (id, user_id, title, body)` with a foreign key to `users`.
pub fn posts() -> Table {
    Table::new("posts")
        .column(Column::new("id", int()))
        .column(Column::new("user_id", int()))
        .column(Column::new("title", varchar(200)))
        .column(Column::new("body", text()))
        .index(Index::new(PRIMARY_KEY, IndexOptions::on(["id"])))
        .index(Index::new("idx_title", IndexOptions::on(["title"])))
        .index(Index::new("fk_posts_user", IndexOptions::on(["user_id"])))
        .foreign_key(ForeignKey::new(
            "fk_posts_user",
            ForeignKeyOptions::new(["user_id"], "users", ["id"])
                .on_delete(ForeignKeyAction::Restrict),
        ))
        .options(TableOptions::new().engine("InnoDB"))
}

pub fn descriptions(operations: &[Operation]) -> Vec<String> {
    operations.iter().map(Operation::description).collect()
}

pub async fn create_test_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Failed to create in-memory SQLite pool")
}

pub async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' AND name=?")
            .bind(name)
            .fetch_optional(pool)
            .await
            .unwrap();
    row.is_some()
}

pub async fn index_exists(pool: &SqlitePool, name: &str) -> bool {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT name FROM sqlite_master WHERE type='index' AND name=?")
            .bind(name)
            .fetch_optional(pool)
            .await
            .unwrap();
    row.is_some()
}

/// Column names of a table, in declaration order.
pub async fn column_names(pool: &SqlitePool, table: &str) -> Vec<String> {
    sqlx::query_as::<_, (String,)>("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind(table)
        .fetch_all(pool)
        .await
        .unwrap()
        .into_iter()
        .map(|(name,)| name)
        .collect()
}
