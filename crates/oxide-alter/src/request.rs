//! Declarative alteration requests.
//!
//! A request names one table and lists the mutations to apply to it, in
//! order. It is the file format the CLI reads:
//!
//! ```json
//! {
//!   "table": "users",
//!   "changes": [
//!     { "op": "add_column", "name": "email",
//!       "options": { "type": "varchar", "length": 255 },
//!       "position": { "after": "id" } },
//!     { "op": "change_column", "name": "name", "new_name": "label" },
//!     { "op": "add_index", "name": "idx_email", "options": { "columns": ["email"] } }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AlterError, Result};
use crate::introspect::SchemaReader;
use crate::operation::ColumnPosition;
use crate::planner::TablePlanner;
use crate::policy::CapabilityPolicy;
use crate::schema::{ColumnOptions, ForeignKeyOptions, IndexOptions, TableOptions};

/// A list of mutations for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterRequest {
    /// Name of the table, as it currently exists (or will be created).
    pub table: String,
    /// Mutations, applied in order.
    #[serde(default)]
    pub changes: Vec<Mutation>,
}

/// One call of the [`TablePlanner`] mutation API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// See [`TablePlanner::add_column`].
    AddColumn {
        /// Column name.
        name: String,
        /// Column definition.
        #[serde(default)]
        options: ColumnOptions,
        /// Where to place the column, or at the end when unset.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<ColumnPosition>,
    },
    /// See [`TablePlanner::change_column`].
    ChangeColumn {
        /// Current column name.
        name: String,
        /// Options merged over the current definition.
        #[serde(default)]
        options: ColumnOptions,
        /// New column name, if the column is renamed.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        new_name: Option<String>,
        /// New placement, if the column moves.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<ColumnPosition>,
    },
    /// See [`TablePlanner::drop_column`].
    DropColumn {
        /// Column name.
        name: String,
    },
    /// See [`TablePlanner::add_index`].
    AddIndex {
        /// Index name.
        name: String,
        /// Index definition.
        options: IndexOptions,
    },
    /// See [`TablePlanner::drop_index`].
    DropIndex {
        /// Index name.
        name: String,
    },
    /// See [`TablePlanner::set_primary_key`].
    SetPrimaryKey {
        /// Key columns, in order.
        columns: Vec<String>,
    },
    /// See [`TablePlanner::add_foreign_key`].
    AddForeignKey {
        /// Constraint name.
        name: String,
        /// Constraint definition.
        options: ForeignKeyOptions,
    },
    /// See [`TablePlanner::drop_foreign_key`].
    DropForeignKey {
        /// Constraint name.
        name: String,
    },
    /// See [`TablePlanner::set_options`].
    SetOptions {
        /// Options merged over the current table options.
        options: TableOptions,
    },
    /// See [`TablePlanner::rename_table`].
    RenameTable {
        /// New table name.
        name: String,
    },
    /// See [`TablePlanner::drop`].
    DropTable,
}

impl Mutation {
    /// Applies the mutation to a planner.
    pub fn apply<P: CapabilityPolicy>(&self, planner: &mut TablePlanner<P>) -> Result<()> {
        match self.clone() {
            Self::AddColumn {
                name,
                options,
                position,
            } => planner.add_column(name, options, position),
            Self::ChangeColumn {
                name,
                options,
                new_name,
                position,
            } => planner.change_column(&name, options, new_name, position),
            Self::DropColumn { name } => planner.drop_column(&name),
            Self::AddIndex { name, options } => planner.add_index(name, options),
            Self::DropIndex { name } => planner.drop_index(&name),
            Self::SetPrimaryKey { columns } => planner.set_primary_key(columns),
            Self::AddForeignKey { name, options } => planner.add_foreign_key(name, options),
            Self::DropForeignKey { name } => planner.drop_foreign_key(&name),
            Self::SetOptions { options } => planner.set_options(options),
            Self::RenameTable { name } => planner.rename_table(name),
            Self::DropTable => planner.drop(),
        }
    }
}

impl AlterRequest {
    /// Creates an empty request for `table`.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            changes: Vec::new(),
        }
    }

    /// Appends a mutation.
    #[must_use]
    pub fn change(mut self, mutation: Mutation) -> Self {
        self.changes.push(mutation);
        self
    }

    /// Loads a request from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let request: Self = serde_json::from_str(&content)?;
        if request.table.is_empty() {
            return Err(AlterError::InvalidRequest(
                "request does not name a table".to_string(),
            ));
        }
        Ok(request)
    }

    /// Applies every mutation to `planner`, stopping at the first error.
    pub fn apply<P: CapabilityPolicy>(&self, planner: &mut TablePlanner<P>) -> Result<()> {
        for (position, mutation) in self.changes.iter().enumerate() {
            debug!(table = %self.table, change = position, mutation = ?mutation, "Applying change");
            mutation.apply(planner)?;
        }
        Ok(())
    }

    /// Seeds a planner for the request's table from `reader` and applies
    /// every mutation to it.
    pub fn planner<R, P>(&self, reader: &R, policy: P) -> Result<TablePlanner<P>>
    where
        R: SchemaReader + ?Sized,
        P: CapabilityPolicy,
    {
        let mut planner = TablePlanner::load(reader, &self.table, policy)?;
        self.apply(&mut planner)?;
        Ok(planner)
    }
}
