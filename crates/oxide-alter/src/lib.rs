//! Backend-aware table alteration planning for Rust.
//!
//! `oxide-alter` computes the operations that turn a table's current shape
//! into a desired one, where:
//! - Column renames and moves are tracked, so a rename is one statement and
//!   not a drop followed by an add
//! - Operations come out in an order every backend accepts (drops before
//!   adds, foreign keys around the indexes they own)
//! - Each backend declares what it can alter, and a plan it could not apply
//!   fails with a typed error instead of a statement the database rejects
//!
//! # Architecture
//!
//! - **Schema** - `Table`, `Column`, `Index`, `ForeignKey` and their options
//! - **Planner** - `TablePlanner`, the mutation API and `plan()`
//! - **Policy** - `CapabilityPolicy`, the per-backend legality rules
//! - **Dialect** - SQL rendering (MySQL, SQLite)
//! - **Executor** - Applies a plan to a database in one transaction
//! - **Introspect** - Where a planner's original table comes from
//! - **Request** - Declarative mutation lists, as read by the CLI
//!
//! # Example
//!
//! ```rust
//! use oxide_alter::prelude::*;
//!
//! let users = Table::new("users")
//!     .column(Column::new("id", ColumnOptions::new(ColumnType::BigInt).not_null()))
//!     .column(Column::new("name", ColumnOptions::new(ColumnType::Varchar).length(80)))
//!     .index(Index::new(PRIMARY_KEY, IndexOptions::on(["id"])));
//!
//! let mut planner = TablePlanner::from_existing(users, SqliteDialect::new());
//! planner.change_column("name", ColumnOptions::default(), Some("label".into()), None)?;
//! planner.add_index("idx_label", IndexOptions::on(["label"]))?;
//!
//! let operations = planner.plan()?;
//! assert_eq!(operations.len(), 2);
//! for operation in &operations {
//!     println!("{:?}", SqliteDialect::new().generate_sql(operation));
//! }
//! # Ok::<(), oxide_alter::error::AlterError>(())
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Show the operations a request plans, as SQL
//! oxide-alter --schema schema.json plan --request add_email.json --dialect mysql --sql
//!
//! # Apply a request to a SQLite database and update the snapshot
//! oxide-alter --schema schema.json apply --request add_email.json --database sqlite:app.db
//!
//! # Show a table of the snapshot
//! oxide-alter --schema schema.json show --table users
//! ```

pub mod compare;
pub mod dialect;
pub mod error;
pub mod executor;
pub mod introspect;
pub mod operation;
pub mod order;
pub mod planner;
pub mod policy;
pub mod request;
pub mod schema;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::compare::Agrees;
    pub use crate::dialect::{MysqlDialect, SqliteDialect, StatementRenderer};
    pub use crate::error::{AlterError, Result};
    pub use crate::executor::{OperationExecutor, SqliteExecutor};
    pub use crate::introspect::{SchemaReader, SchemaSnapshot};
    pub use crate::operation::{
        AddColumnOp, AddForeignKeyOp, AddIndexOp, AlterTableOptionsOp, ChangeColumnOp,
        ColumnPosition, CreateIndexOp, CreateTableOp, DropColumnOp, DropForeignKeyOp,
        DropIndexOp, DropTableOp, Operation, RenameTableOp,
    };
    pub use crate::planner::TablePlanner;
    pub use crate::policy::CapabilityPolicy;
    pub use crate::request::{AlterRequest, Mutation};
    pub use crate::schema::{
        Column, ColumnOptions, ColumnType, DefaultValue, ForeignKey, ForeignKeyAction,
        ForeignKeyOptions, Index, IndexMethod, IndexOptions, Table, TableOptions,
        PRIMARY_KEY,
    };
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    #[test]
    fn test_prelude_round_trip() {
        let table = Table::new("tags")
            .column(Column::new("id", ColumnOptions::new(ColumnType::Integer)))
            .column(Column::new("label", ColumnOptions::new(ColumnType::Text)));

        let mut planner = TablePlanner::new("tags", MysqlDialect::new());
        planner
            .add_column("id", ColumnOptions::new(ColumnType::Integer), None)
            .unwrap();
        planner
            .add_column("label", ColumnOptions::new(ColumnType::Text), None)
            .unwrap();

        assert_eq!(planner.pending(), &table);
        assert!(matches!(&planner.plan().unwrap()[..], [Operation::CreateTable(_)]));
    }
}
