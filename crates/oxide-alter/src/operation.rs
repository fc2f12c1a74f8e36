//! Alteration operations.
//!
//! An [`Operation`] is one backend-agnostic unit of structural change
//! produced by [`TablePlanner::plan`](crate::planner::TablePlanner::plan).
//! Statement renderers turn operations into SQL text.

use serde::{Deserialize, Serialize};

use crate::compare::Agrees;
use crate::schema::{Column, ColumnOptions, ForeignKey, Index, TableOptions};

/// Where a column is placed relative to the other columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnPosition {
    /// Before every other column.
    First,
    /// Directly after the named column.
    After(String),
}

impl ColumnPosition {
    /// Creates an `After` position.
    #[must_use]
    pub fn after(column: impl Into<String>) -> Self {
        Self::After(column.into())
    }
}

/// A single alteration operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    /// Create a new table.
    CreateTable(CreateTableOp),
    /// Create an index right after its table was created.
    CreateIndex(CreateIndexOp),
    /// Drop a table.
    DropTable(DropTableOp),
    /// Drop a column.
    DropColumn(DropColumnOp),
    /// Add a column.
    AddColumn(AddColumnOp),
    /// Change, rename or move a column.
    ChangeColumn(ChangeColumnOp),
    /// Drop an index.
    DropIndex(DropIndexOp),
    /// Add an index to an existing table.
    AddIndex(AddIndexOp),
    /// Drop a foreign key constraint.
    DropForeignKey(DropForeignKeyOp),
    /// Add a foreign key constraint.
    AddForeignKey(AddForeignKeyOp),
    /// Rename a table.
    RenameTable(RenameTableOp),
    /// Change table-level options.
    AlterTableOptions(AlterTableOptionsOp),
}

impl Operation {
    /// Returns the name of the table the operation runs against.
    ///
    /// For a rename this is the table's name before the rename.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable(op) => &op.table,
            Self::CreateIndex(op) => &op.table,
            Self::DropTable(op) => &op.table,
            Self::DropColumn(op) => &op.table,
            Self::AddColumn(op) => &op.table,
            Self::ChangeColumn(op) => &op.table,
            Self::DropIndex(op) => &op.table,
            Self::AddIndex(op) => &op.table,
            Self::DropForeignKey(op) => &op.table,
            Self::AddForeignKey(op) => &op.table,
            Self::RenameTable(op) => &op.old_name,
            Self::AlterTableOptions(op) => &op.table,
        }
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable(op) => format!("Create table '{}'", op.table),
            Self::CreateIndex(op) => {
                format!("Create index '{}' on table '{}'", op.index.name, op.table)
            }
            Self::DropTable(op) => format!("Drop table '{}'", op.table),
            Self::DropColumn(op) => {
                format!("Drop column '{}' from table '{}'", op.column, op.table)
            }
            Self::AddColumn(op) => {
                format!("Add column '{}' to table '{}'", op.column.name, op.table)
            }
            Self::ChangeColumn(op) => match &op.new_name {
                Some(new_name) => format!(
                    "Change column '{}' to '{}' in table '{}'",
                    op.name, new_name, op.table
                ),
                None => format!("Change column '{}' in table '{}'", op.name, op.table),
            },
            Self::DropIndex(op) => {
                format!("Drop index '{}' from table '{}'", op.index.name, op.table)
            }
            Self::AddIndex(op) => {
                format!("Add index '{}' to table '{}'", op.index.name, op.table)
            }
            Self::DropForeignKey(op) => {
                format!("Drop foreign key '{}' from table '{}'", op.name, op.table)
            }
            Self::AddForeignKey(op) => format!(
                "Add foreign key '{}' to table '{}'",
                op.foreign_key.name, op.table
            ),
            Self::RenameTable(op) => {
                format!("Rename table '{}' to '{}'", op.old_name, op.new_name)
            }
            Self::AlterTableOptions(op) => format!("Alter options of table '{}'", op.table),
        }
    }
}

/// Create table operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTableOp {
    /// Table name.
    pub table: String,
    /// Column definitions, in order.
    pub columns: Vec<Column>,
    /// Indexes declared inside the CREATE TABLE statement.
    pub indexes: Vec<Index>,
    /// Foreign keys declared inside the CREATE TABLE statement.
    pub foreign_keys: Vec<ForeignKey>,
    /// Table options.
    pub options: TableOptions,
}

impl CreateTableOp {
    /// Returns the primary key index, if declared.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Index> {
        self.indexes.iter().find(|index| index.is_primary())
    }
}

impl From<CreateTableOp> for Operation {
    fn from(op: CreateTableOp) -> Self {
        Self::CreateTable(op)
    }
}

/// Create index operation, following a CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexOp {
    /// Table name.
    pub table: String,
    /// Index definition.
    pub index: Index,
}

impl From<CreateIndexOp> for Operation {
    fn from(op: CreateIndexOp) -> Self {
        Self::CreateIndex(op)
    }
}

/// Drop table operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableOp {
    /// Table name.
    pub table: String,
}

impl From<DropTableOp> for Operation {
    fn from(op: DropTableOp) -> Self {
        Self::DropTable(op)
    }
}

/// Drop column operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnOp {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

impl From<DropColumnOp> for Operation {
    fn from(op: DropColumnOp) -> Self {
        Self::DropColumn(op)
    }
}

/// Add column operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddColumnOp {
    /// Table name.
    pub table: String,
    /// Column definition.
    pub column: Column,
    /// Placement, when the column is not appended at the end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ColumnPosition>,
}

impl From<AddColumnOp> for Operation {
    fn from(op: AddColumnOp) -> Self {
        Self::AddColumn(op)
    }
}

/// Change column operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeColumnOp {
    /// Table name.
    pub table: String,
    /// Current (original) column name.
    pub name: String,
    /// New column name, when renamed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    /// Complete desired column definition.
    pub column: Column,
    /// Options of the column before the change.
    pub previous: ColumnOptions,
    /// New placement, when the column moves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<ColumnPosition>,
}

impl ChangeColumnOp {
    /// Returns true if any column option changes.
    #[must_use]
    pub fn options_changed(&self) -> bool {
        !self.column.options.agrees_with(&self.previous)
    }
}

impl From<ChangeColumnOp> for Operation {
    fn from(op: ChangeColumnOp) -> Self {
        Self::ChangeColumn(op)
    }
}

/// Drop index operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndexOp {
    /// Table name.
    pub table: String,
    /// Definition of the index being dropped.
    pub index: Index,
}

impl From<DropIndexOp> for Operation {
    fn from(op: DropIndexOp) -> Self {
        Self::DropIndex(op)
    }
}

/// Add index operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddIndexOp {
    /// Table name.
    pub table: String,
    /// Index definition.
    pub index: Index,
}

impl From<AddIndexOp> for Operation {
    fn from(op: AddIndexOp) -> Self {
        Self::AddIndex(op)
    }
}

/// Drop foreign key operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropForeignKeyOp {
    /// Table name.
    pub table: String,
    /// Constraint name.
    pub name: String,
}

impl From<DropForeignKeyOp> for Operation {
    fn from(op: DropForeignKeyOp) -> Self {
        Self::DropForeignKey(op)
    }
}

/// Add foreign key operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddForeignKeyOp {
    /// Table name.
    pub table: String,
    /// Foreign key definition.
    pub foreign_key: ForeignKey,
}

impl From<AddForeignKeyOp> for Operation {
    fn from(op: AddForeignKeyOp) -> Self {
        Self::AddForeignKey(op)
    }
}

/// Rename table operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableOp {
    /// Current table name.
    pub old_name: String,
    /// New table name.
    pub new_name: String,
}

impl From<RenameTableOp> for Operation {
    fn from(op: RenameTableOp) -> Self {
        Self::RenameTable(op)
    }
}

/// Alter table options operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterTableOptionsOp {
    /// Table name.
    pub table: String,
    /// Only the options that change.
    pub options: TableOptions,
}

impl From<AlterTableOptionsOp> for Operation {
    fn from(op: AlterTableOptionsOp) -> Self {
        Self::AlterTableOptions(op)
    }
}
