//! Database dialect implementations.
//!
//! A dialect is both the [`CapabilityPolicy`] of its backend and the
//! [`StatementRenderer`] that turns planned operations into SQL text. The
//! renderer never decides whether an operation is legal: the planner already
//! checked every operation against the same dialect's policy.

mod mysql;
mod sqlite;

pub use mysql::MysqlDialect;
pub use sqlite::SqliteDialect;

use crate::operation::Operation;
use crate::policy::CapabilityPolicy;
use crate::schema::{ColumnOptions, ForeignKey, ForeignKeyAction};

/// Trait for database-specific SQL generation.
pub trait StatementRenderer: CapabilityPolicy {
    /// Generates SQL for an operation. Some operations need more than one
    /// statement.
    fn generate_sql(&self, operation: &Operation) -> Vec<String>;

    /// Returns the SQL type for the given column options.
    fn type_name(&self, options: &ColumnOptions) -> String;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Returns a parenthesized, quoted column list.
    fn column_list(&self, columns: &[String]) -> String {
        let quoted: Vec<String> = columns.iter().map(|c| self.quote_identifier(c)).collect();
        format!("({})", quoted.join(", "))
    }

    /// Generates a `CONSTRAINT ... FOREIGN KEY ... REFERENCES ...` clause.
    fn foreign_key_clause(&self, foreign_key: &ForeignKey) -> String {
        let options = &foreign_key.options;
        let mut sql = format!(
            "CONSTRAINT {} FOREIGN KEY {} REFERENCES {} {}",
            self.quote_identifier(&foreign_key.name),
            self.column_list(&options.columns),
            self.quote_identifier(&options.referenced_table),
            self.column_list(&options.referenced_columns),
        );
        if let Some(action) = options.on_delete.filter(|a| *a != ForeignKeyAction::NoAction) {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.to_sql());
        }
        if let Some(action) = options.on_update.filter(|a| *a != ForeignKeyAction::NoAction) {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.to_sql());
        }
        sql
    }
}

/// Quotes a string literal.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
