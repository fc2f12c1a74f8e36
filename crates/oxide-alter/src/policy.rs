//! Backend capability rules.
//!
//! Some engines cannot express certain alterations: SQLite, for instance,
//! has no ALTER COLUMN and cannot add or drop constraints once a table
//! exists. A [`CapabilityPolicy`] answers whether an [`Operation`] can be
//! expressed for its backend, so the planner fails with a typed error
//! instead of emitting a statement the engine would reject.
//!
//! Policies are plain values handed to the planner; there is no global
//! backend registry.

use crate::error::{AlterError, Result};
use crate::operation::{ChangeColumnOp, Operation};
use crate::schema::{Index, IndexMethod};

/// Per-backend set of capability rules.
pub trait CapabilityPolicy: Send + Sync {
    /// Returns the backend name.
    fn name(&self) -> &'static str;

    /// Returns whether existing columns can be altered in place (type,
    /// length, nullability, ...). Renames are always allowed.
    fn supports_alter_column(&self) -> bool;

    /// Returns whether columns can be placed with FIRST / AFTER.
    fn supports_column_positions(&self) -> bool;

    /// Returns whether primary and unique constraints can be added or
    /// dropped after the table was created.
    fn supports_constraint_changes(&self) -> bool;

    /// Returns whether foreign keys can be added or dropped after the table
    /// was created.
    fn supports_foreign_key_changes(&self) -> bool;

    /// Returns whether table options can be changed.
    fn supports_table_options(&self) -> bool;

    /// Returns whether plain indexes can be declared inside CREATE TABLE.
    fn supports_inline_indexes(&self) -> bool;

    /// Returns whether the index method is available.
    fn supports_index_method(&self, method: IndexMethod) -> bool {
        let _ = method;
        true
    }

    /// Checks that the backend can express `operation`.
    fn permit(&self, operation: &Operation) -> Result<()> {
        match operation {
            Operation::CreateTable(op) => {
                for index in &op.indexes {
                    self.permit_index_method(index)?;
                }
                Ok(())
            }

            Operation::CreateIndex(op) => self.permit_index_method(&op.index),

            Operation::AddColumn(op) => {
                if op.position.is_some() && !self.supports_column_positions() {
                    return Err(self.forbid(
                        &op.column.name,
                        "columns can only be appended at the end of the table",
                    ));
                }
                Ok(())
            }

            Operation::ChangeColumn(op) => self.permit_change_column(op),

            Operation::DropIndex(op) => {
                if op.index.is_constraint() && !self.supports_constraint_changes() {
                    return Err(self.forbid(
                        &op.index.name,
                        "primary and unique constraints cannot be dropped after table creation",
                    ));
                }
                Ok(())
            }

            Operation::AddIndex(op) => {
                if op.index.is_constraint() && !self.supports_constraint_changes() {
                    return Err(self.forbid(
                        &op.index.name,
                        "primary and unique constraints can only be declared at table creation",
                    ));
                }
                self.permit_index_method(&op.index)
            }

            Operation::DropForeignKey(op) => {
                if !self.supports_foreign_key_changes() {
                    return Err(self.forbid(
                        &op.name,
                        "foreign keys cannot be dropped after table creation",
                    ));
                }
                Ok(())
            }

            Operation::AddForeignKey(op) => {
                if !self.supports_foreign_key_changes() {
                    return Err(self.forbid(
                        &op.foreign_key.name,
                        "foreign keys can only be declared at table creation",
                    ));
                }
                Ok(())
            }

            Operation::AlterTableOptions(op) => {
                if !self.supports_table_options() {
                    return Err(self.forbid(&op.table, "table options cannot be changed"));
                }
                Ok(())
            }

            Operation::DropTable(_) | Operation::DropColumn(_) | Operation::RenameTable(_) => {
                Ok(())
            }
        }
    }

    /// Checks a column change. Used by [`CapabilityPolicy::permit`].
    fn permit_change_column(&self, op: &ChangeColumnOp) -> Result<()> {
        if op.position.is_some() && !self.supports_column_positions() {
            return Err(self.forbid(&op.name, "columns cannot be moved"));
        }
        if !self.supports_alter_column() && (op.options_changed() || op.position.is_some()) {
            return Err(self.forbid(
                &op.name,
                "columns cannot be altered after creation, only renamed",
            ));
        }
        Ok(())
    }

    /// Checks an index method. Used by [`CapabilityPolicy::permit`].
    fn permit_index_method(&self, index: &Index) -> Result<()> {
        let method = index.method();
        if !self.supports_index_method(method) {
            return Err(self.forbid(
                &index.name,
                &format!("index method {method:?} is not supported"),
            ));
        }
        Ok(())
    }

    /// Builds the error for a forbidden change of `entity`.
    fn forbid(&self, entity: &str, reason: &str) -> AlterError {
        AlterError::unsupported(self.name(), entity, reason)
    }
}
