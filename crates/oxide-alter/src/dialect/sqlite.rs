//! SQLite dialect.
//!
//! SQLite's ALTER TABLE can only add, drop and rename columns and rename the
//! table. Constraints, foreign keys and non-b-tree index methods exist only
//! as part of CREATE TABLE, so the policy side of this dialect models an
//! append-only backend.

use crate::operation::{ChangeColumnOp, CreateTableOp, Operation};
use crate::policy::CapabilityPolicy;
use crate::schema::{Column, ColumnOptions, ColumnType, Index, IndexMethod};

use super::StatementRenderer;

/// SQLite dialect: append-only capability policy and statement renderer.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generates a column definition. `primary_key` declares the column as
    /// an inline `INTEGER PRIMARY KEY AUTOINCREMENT`.
    fn column_definition(&self, column: &Column, primary_key: bool) -> String {
        let options = &column.options;
        let mut parts = vec![self.quote_identifier(&column.name)];

        let type_name = self.type_name(options);
        if !type_name.is_empty() {
            parts.push(type_name);
        }

        if primary_key {
            parts.push("PRIMARY KEY AUTOINCREMENT".to_string());
        } else if !options.is_nullable() {
            parts.push("NOT NULL".to_string());
        }

        if let Some(default) = &options.default {
            parts.push(format!("DEFAULT {}", default.to_sql()));
        }

        parts.join(" ")
    }

    /// Generates SQL for creating a table, followed by any plain index that
    /// SQLite cannot declare inside CREATE TABLE.
    fn create_table_sql(&self, op: &CreateTableOp) -> Vec<String> {
        // A single auto-increment primary key column must be declared inline.
        let inline_key = op
            .primary_key()
            .and_then(|pk| match pk.options.columns.as_slice() {
                [column] => Some(column.as_str()),
                _ => None,
            })
            .filter(|name| {
                op.columns
                    .iter()
                    .any(|c| c.name == *name && c.options.is_auto_increment())
            });

        let mut parts: Vec<String> = op
            .columns
            .iter()
            .map(|c| self.column_definition(c, Some(c.name.as_str()) == inline_key))
            .collect();

        let mut plain = Vec::new();
        for index in &op.indexes {
            if index.is_primary() {
                if inline_key.is_none() {
                    parts.push(format!(
                        "PRIMARY KEY {}",
                        self.column_list(&index.options.columns)
                    ));
                }
            } else if index.is_constraint() {
                parts.push(format!(
                    "CONSTRAINT {} UNIQUE {}",
                    self.quote_identifier(&index.name),
                    self.column_list(&index.options.columns)
                ));
            } else {
                plain.push(index);
            }
        }

        for foreign_key in &op.foreign_keys {
            parts.push(self.foreign_key_clause(foreign_key));
        }

        let mut sql = vec![format!(
            "CREATE TABLE {} (\n  {}\n)",
            self.quote_identifier(&op.table),
            parts.join(",\n  ")
        )];
        sql.extend(plain.into_iter().map(|index| self.create_index_sql(&op.table, index)));
        sql
    }

    /// Generates SQL for creating an index.
    fn create_index_sql(&self, table: &str, index: &Index) -> String {
        let mut sql = String::from("CREATE ");
        if index.is_constraint() {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        sql.push_str(&self.quote_identifier(&index.name));
        sql.push_str(" ON ");
        sql.push_str(&self.quote_identifier(table));
        sql.push(' ');
        sql.push_str(&self.column_list(&index.options.columns));
        sql
    }

    /// Generates SQL for a column change. Only the rename part of a change
    /// has an SQLite statement.
    fn change_column_sql(&self, op: &ChangeColumnOp) -> Vec<String> {
        let mut sql = Vec::new();
        if let Some(new_name) = &op.new_name {
            sql.push(format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                self.quote_identifier(&op.table),
                self.quote_identifier(&op.name),
                self.quote_identifier(new_name)
            ));
        }
        if op.options_changed() || op.position.is_some() {
            sql.push(format!(
                "-- ALTER COLUMN not supported in SQLite: {}.{}",
                op.table, op.name
            ));
        }
        sql
    }
}

impl CapabilityPolicy for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn supports_alter_column(&self) -> bool {
        false
    }

    fn supports_column_positions(&self) -> bool {
        false
    }

    fn supports_constraint_changes(&self) -> bool {
        false
    }

    fn supports_foreign_key_changes(&self) -> bool {
        false
    }

    fn supports_table_options(&self) -> bool {
        false
    }

    fn supports_inline_indexes(&self) -> bool {
        false
    }

    fn supports_index_method(&self, method: IndexMethod) -> bool {
        method == IndexMethod::BTree
    }
}

impl StatementRenderer for SqliteDialect {
    fn generate_sql(&self, operation: &Operation) -> Vec<String> {
        match operation {
            Operation::CreateTable(op) => self.create_table_sql(op),

            Operation::CreateIndex(op) => vec![self.create_index_sql(&op.table, &op.index)],

            Operation::AddIndex(op) => vec![self.create_index_sql(&op.table, &op.index)],

            Operation::DropTable(op) => {
                vec![format!("DROP TABLE {}", self.quote_identifier(&op.table))]
            }

            Operation::RenameTable(op) => vec![format!(
                "ALTER TABLE {} RENAME TO {}",
                self.quote_identifier(&op.old_name),
                self.quote_identifier(&op.new_name)
            )],

            Operation::AddColumn(op) => vec![format!(
                "ALTER TABLE {} ADD COLUMN {}",
                self.quote_identifier(&op.table),
                self.column_definition(&op.column, false)
            )],

            Operation::DropColumn(op) => vec![format!(
                "ALTER TABLE {} DROP COLUMN {}",
                self.quote_identifier(&op.table),
                self.quote_identifier(&op.column)
            )],

            Operation::ChangeColumn(op) => self.change_column_sql(op),

            Operation::DropIndex(op) => {
                vec![format!("DROP INDEX {}", self.quote_identifier(&op.index.name))]
            }

            Operation::AddForeignKey(op) => vec![format!(
                "-- Foreign key {} cannot be added after table creation in SQLite",
                op.foreign_key.name
            )],

            Operation::DropForeignKey(op) => vec![format!(
                "-- Foreign key {} cannot be dropped in SQLite",
                op.name
            )],

            Operation::AlterTableOptions(op) => vec![format!(
                "-- Table options of {} cannot be changed in SQLite",
                op.table
            )],
        }
    }

    fn type_name(&self, options: &ColumnOptions) -> String {
        let Some(column_type) = options.column_type else {
            return String::new();
        };
        match column_type {
            ColumnType::TinyInt
            | ColumnType::SmallInt
            | ColumnType::Integer
            | ColumnType::BigInt
            | ColumnType::Boolean => "INTEGER",
            ColumnType::Decimal => "NUMERIC",
            ColumnType::Float | ColumnType::Double => "REAL",
            ColumnType::Char
            | ColumnType::Varchar
            | ColumnType::Text
            | ColumnType::Json
            | ColumnType::Uuid
            | ColumnType::Date
            | ColumnType::Time
            | ColumnType::DateTime
            | ColumnType::Timestamp => "TEXT",
            ColumnType::Blob | ColumnType::Binary | ColumnType::VarBinary => "BLOB",
        }
        .to_string()
    }
}
