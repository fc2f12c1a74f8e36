//! Table alteration planner.
//!
//! A [`TablePlanner`] holds two shapes of one table: the *original* shape,
//! as introspected from the database (absent when the table does not exist
//! yet), and the *pending* shape the caller builds up through the mutation
//! methods. [`TablePlanner::plan`] compares both and returns the ordered
//! [`Operation`]s that turn the original into the pending shape, after
//! checking each of them against the planner's [`CapabilityPolicy`].
//!
//! # Example
//!
//! ```
//! use oxide_alter::prelude::*;
//!
//! let users = Table::new("users")
//!     .column(Column::new("id", ColumnOptions::new(ColumnType::Integer)))
//!     .column(Column::new("name", ColumnOptions::new(ColumnType::Varchar).length(80)));
//!
//! let mut planner = TablePlanner::from_existing(users, MysqlDialect::new());
//! planner
//!     .add_column(
//!         "email",
//!         ColumnOptions::new(ColumnType::Varchar).length(255),
//!         Some(ColumnPosition::after("id")),
//!     )
//!     .unwrap();
//!
//! let operations = planner.plan().unwrap();
//! assert_eq!(operations.len(), 1);
//! ```

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::compare::Agrees;
use crate::error::{AlterError, Result};
use crate::executor::OperationExecutor;
use crate::introspect::SchemaReader;
use crate::operation::{
    AddColumnOp, AddForeignKeyOp, AddIndexOp, AlterTableOptionsOp, ChangeColumnOp, ColumnPosition,
    CreateIndexOp, CreateTableOp, DropColumnOp, DropForeignKeyOp, DropIndexOp, DropTableOp,
    Operation, RenameTableOp,
};
use crate::order::ColumnOrder;
use crate::policy::CapabilityPolicy;
use crate::schema::{
    Column, ColumnOptions, ForeignKey, ForeignKeyOptions, Index, IndexOptions, Table,
    TableOptions, PRIMARY_KEY,
};

/// Plans the alteration of a single table for one backend.
#[derive(Debug, Clone)]
pub struct TablePlanner<P: CapabilityPolicy> {
    policy: P,
    original: Option<Table>,
    pending: Table,
    dropped: bool,
    /// Original column name -> current pending name.
    renames: IndexMap<String, String>,
}

impl<P: CapabilityPolicy> TablePlanner<P> {
    /// Creates a planner for a table that does not exist yet.
    pub fn new(name: impl Into<String>, policy: P) -> Self {
        Self {
            policy,
            original: None,
            pending: Table::new(name),
            dropped: false,
            renames: IndexMap::new(),
        }
    }

    /// Creates a planner seeded with an introspected table.
    pub fn from_existing(table: Table, policy: P) -> Self {
        Self {
            policy,
            original: Some(table.clone()),
            pending: table,
            dropped: false,
            renames: IndexMap::new(),
        }
    }

    /// Creates a planner for `name`, seeded from a schema reader.
    pub fn load<R: SchemaReader + ?Sized>(reader: &R, name: &str, policy: P) -> Result<Self> {
        match reader.read_table(name)? {
            Some(table) => {
                debug!(table = %name, columns = table.columns.len(), "Loaded existing table");
                Ok(Self::from_existing(table, policy))
            }
            None => {
                debug!(table = %name, "Table does not exist yet");
                Ok(Self::new(name, policy))
            }
        }
    }

    /// Returns the pending table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.pending.name
    }

    /// Returns the capability policy.
    #[must_use]
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Returns the original table, if it exists.
    #[must_use]
    pub fn original(&self) -> Option<&Table> {
        self.original.as_ref()
    }

    /// Returns the pending table.
    #[must_use]
    pub fn pending(&self) -> &Table {
        &self.pending
    }

    /// Returns true if the table exists in the database.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.original.is_some()
    }

    /// Returns true if the table is marked as dropped.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        self.dropped
    }

    /// Returns the recorded column renames, original name to current name.
    #[must_use]
    pub fn renamed_columns(&self) -> &IndexMap<String, String> {
        &self.renames
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Adds a column.
    ///
    /// Without a position the column is appended at the end.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        options: ColumnOptions,
        position: Option<ColumnPosition>,
    ) -> Result<()> {
        self.ensure_alterable()?;
        let name = name.into();
        if self.pending.columns.contains_key(&name) {
            return Err(self.column_exists(&name));
        }

        let index = match &position {
            None => self.pending.columns.len(),
            Some(position) => self.resolve_position(position, None)?,
        };
        let column = Column::new(name.clone(), options);
        self.pending.columns.shift_insert(index, name, column);
        Ok(())
    }

    /// Changes a column.
    ///
    /// `options` are merged over the current options. A `new_name` that
    /// differs from `name` renames the column in place, and every pending
    /// index or foreign key over it follows the rename. A `position` moves
    /// the column.
    pub fn change_column(
        &mut self,
        name: &str,
        options: ColumnOptions,
        new_name: Option<String>,
        position: Option<ColumnPosition>,
    ) -> Result<()> {
        self.ensure_alterable()?;
        let Some(index) = self.pending.columns.get_index_of(name) else {
            return Err(self.column_missing(name));
        };

        let new_name = new_name.filter(|new_name| new_name != name);
        if let Some(new_name) = &new_name {
            if self.pending.columns.contains_key(new_name) {
                return Err(self.column_exists(new_name));
            }
        }
        if let Some(position) = &position {
            self.resolve_position(position, Some(name))?;
        }

        // Everything is validated; from here on the mutation cannot fail.
        let current = match &new_name {
            Some(new_name) => {
                let Some((_, mut column)) = self.pending.columns.shift_remove_index(index) else {
                    return Err(self.column_missing(name));
                };
                column.name.clone_from(new_name);
                self.pending
                    .columns
                    .shift_insert(index, new_name.clone(), column);
                self.record_rename(name, new_name);
                self.rewrite_references(name, new_name);
                new_name.as_str()
            }
            None => name,
        };

        if let Some(column) = self.pending.columns.get_mut(current) {
            column.options.merge(options);
        }

        if let (Some(position), Some(from)) =
            (&position, self.pending.columns.get_index_of(current))
        {
            let to = match position {
                ColumnPosition::First => Some(0),
                ColumnPosition::After(anchor) => self
                    .pending
                    .columns
                    .get_index_of(anchor.as_str())
                    .map(|anchor| if from < anchor { anchor } else { anchor + 1 }),
            };
            if let Some(to) = to {
                self.pending.columns.move_index(from, to);
            }
        }
        Ok(())
    }

    /// Drops a column.
    ///
    /// Indexes and foreign keys over the column are left in place;
    /// [`TablePlanner::plan`] rejects them if they are not dropped too.
    pub fn drop_column(&mut self, name: &str) -> Result<()> {
        self.ensure_alterable()?;
        if self.pending.columns.shift_remove(name).is_none() {
            return Err(self.column_missing(name));
        }
        self.renames.retain(|_, current| current != name);
        Ok(())
    }

    /// Adds an index. The [`PRIMARY_KEY`] name makes it the primary key.
    pub fn add_index(&mut self, name: impl Into<String>, options: IndexOptions) -> Result<()> {
        self.ensure_alterable()?;
        let index = Index::new(name, options);
        if self.pending.indexes.contains_key(&index.name) {
            return Err(AlterError::IndexExists {
                table: self.pending.name.clone(),
                index: index.name,
            });
        }
        self.pending.indexes.insert(index.name.clone(), index);
        Ok(())
    }

    /// Drops an index.
    pub fn drop_index(&mut self, name: &str) -> Result<()> {
        self.ensure_alterable()?;
        if self.pending.indexes.shift_remove(name).is_none() {
            return Err(AlterError::IndexMissing {
                table: self.pending.name.clone(),
                index: name.to_string(),
            });
        }
        Ok(())
    }

    /// Sets the primary key.
    pub fn set_primary_key<I, S>(&mut self, columns: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_index(PRIMARY_KEY, IndexOptions::on(columns).primary())
    }

    /// Adds a foreign key.
    pub fn add_foreign_key(
        &mut self,
        name: impl Into<String>,
        options: ForeignKeyOptions,
    ) -> Result<()> {
        self.ensure_alterable()?;
        let foreign_key = ForeignKey::new(name, options);
        if self.pending.foreign_keys.contains_key(&foreign_key.name) {
            return Err(AlterError::ForeignKeyExists {
                table: self.pending.name.clone(),
                foreign_key: foreign_key.name,
            });
        }
        self.pending
            .foreign_keys
            .insert(foreign_key.name.clone(), foreign_key);
        Ok(())
    }

    /// Drops a foreign key together with its supporting index.
    pub fn drop_foreign_key(&mut self, name: &str) -> Result<()> {
        self.ensure_alterable()?;
        if self.pending.foreign_keys.shift_remove(name).is_none() {
            return Err(AlterError::ForeignKeyMissing {
                table: self.pending.name.clone(),
                foreign_key: name.to_string(),
            });
        }
        self.pending.indexes.shift_remove(name);
        Ok(())
    }

    /// Merges table options.
    pub fn set_options(&mut self, options: TableOptions) -> Result<()> {
        self.ensure_alterable()?;
        self.pending.options.merge(options);
        Ok(())
    }

    /// Renames the table.
    pub fn rename_table(&mut self, new_name: impl Into<String>) -> Result<()> {
        self.ensure_alterable()?;
        self.pending.name = new_name.into();
        Ok(())
    }

    /// Marks the table as dropped.
    pub fn drop(&mut self) -> Result<()> {
        self.ensure_alterable()?;
        if self.original.is_none() {
            return Err(AlterError::TableMissing(self.pending.name.clone()));
        }
        self.dropped = true;
        Ok(())
    }

    // ========================================================================
    // Planning
    // ========================================================================

    /// Computes the operations that turn the original table into the
    /// pending one.
    ///
    /// The first operation the policy rejects aborts planning.
    pub fn plan(&self) -> Result<Vec<Operation>> {
        let operations = match &self.original {
            None => {
                self.check_references()?;
                self.plan_create()?
            }
            Some(original) => {
                if !self.dropped {
                    self.check_references()?;
                }
                self.plan_alter(original)?
            }
        };

        info!(
            table = %self.pending.name,
            backend = self.policy.name(),
            operations = operations.len(),
            "Planned table alteration"
        );
        Ok(operations)
    }

    /// Makes the pending table the original one, as after a successful
    /// apply of [`TablePlanner::plan`].
    pub fn commit(&mut self) {
        if self.dropped {
            self.original = None;
            self.pending = Table::new(self.pending.name.clone());
            self.dropped = false;
        } else if self.original.is_some() || !self.pending.columns.is_empty() {
            self.original = Some(self.pending.clone());
        }
        self.renames.clear();
        debug!(table = %self.pending.name, "Committed pending table state");
    }

    /// Plans, runs the operations through `executor` and commits on
    /// success. On failure, or when the executor does not apply what it
    /// runs, the pending state is kept.
    pub async fn execute<E: OperationExecutor>(&mut self, executor: &E) -> Result<Vec<Operation>> {
        let operations = self.plan()?;
        if !operations.is_empty() {
            executor.run(&operations).await?;
        }
        if !executor.applies() {
            debug!(table = %self.pending.name, "Executor did not apply the plan, keeping pending state");
            return Ok(operations);
        }
        self.commit();

        info!(
            table = %self.pending.name,
            operations = operations.len(),
            "Table alteration applied"
        );
        Ok(operations)
    }

    fn plan_create(&self) -> Result<Vec<Operation>> {
        let mut operations = Vec::new();
        if self.pending.columns.is_empty() {
            return Ok(operations);
        }

        let table = &self.pending.name;
        let mut inline = Vec::new();
        let mut deferred = Vec::new();
        for index in self.pending.indexes.values() {
            if self.pending.is_foreign_key_index(&index.name) {
                continue;
            }
            if index.is_constraint() || self.policy.supports_inline_indexes() {
                inline.push(index.clone());
            } else {
                deferred.push(index.clone());
            }
        }

        self.record(
            &mut operations,
            CreateTableOp {
                table: table.clone(),
                columns: self.pending.columns.values().cloned().collect(),
                indexes: inline,
                foreign_keys: self.pending.foreign_keys.values().cloned().collect(),
                options: self.pending.options.clone(),
            },
        )?;
        for index in deferred {
            self.record(
                &mut operations,
                CreateIndexOp {
                    table: table.clone(),
                    index,
                },
            )?;
        }
        Ok(operations)
    }

    fn plan_alter(&self, original: &Table) -> Result<Vec<Operation>> {
        let mut operations = Vec::new();
        let table = &original.name;

        for foreign_key in original.foreign_keys.values() {
            let unchanged = self
                .pending
                .get_foreign_key(&foreign_key.name)
                .is_some_and(|pending| self.foreign_key_agrees(pending, foreign_key));
            if !unchanged {
                self.record(
                    &mut operations,
                    DropForeignKeyOp {
                        table: table.clone(),
                        name: foreign_key.name.clone(),
                    },
                )?;
            }
        }

        for index in original.indexes.values() {
            if original.is_foreign_key_index(&index.name) {
                continue;
            }
            let unchanged = self
                .pending
                .get_index(&index.name)
                .is_some_and(|pending| self.index_agrees(pending, index));
            if !unchanged {
                self.record(
                    &mut operations,
                    DropIndexOp {
                        table: table.clone(),
                        index: index.clone(),
                    },
                )?;
            }
        }

        // Nothing else applies to a dropped table.
        if self.dropped {
            self.record(
                &mut operations,
                DropTableOp {
                    table: table.clone(),
                },
            )?;
            return Ok(operations);
        }

        for column in original.columns.values() {
            if self.current_name(original, &column.name).is_none() {
                self.record(
                    &mut operations,
                    DropColumnOp {
                        table: table.clone(),
                        column: column.name.clone(),
                    },
                )?;
            }
        }

        let table = &self.pending.name;
        if table != &original.name {
            self.record(
                &mut operations,
                RenameTableOp {
                    old_name: original.name.clone(),
                    new_name: table.clone(),
                },
            )?;
        }

        let options = self.pending.options.changed_from(&original.options);
        if !options.is_empty() {
            self.record(
                &mut operations,
                AlterTableOptionsOp {
                    table: table.clone(),
                    options,
                },
            )?;
        }

        self.plan_columns(original, &mut operations)?;

        for index in self.pending.indexes.values() {
            if self.pending.is_foreign_key_index(&index.name) {
                continue;
            }
            let unchanged = original
                .get_index(&index.name)
                .is_some_and(|reference| self.index_agrees(index, reference));
            if !unchanged {
                self.record(
                    &mut operations,
                    AddIndexOp {
                        table: table.clone(),
                        index: index.clone(),
                    },
                )?;
            }
        }

        for foreign_key in self.pending.foreign_keys.values() {
            let unchanged = original
                .get_foreign_key(&foreign_key.name)
                .is_some_and(|reference| self.foreign_key_agrees(foreign_key, reference));
            if !unchanged {
                self.record(
                    &mut operations,
                    AddForeignKeyOp {
                        table: table.clone(),
                        foreign_key: foreign_key.clone(),
                    },
                )?;
            }
        }

        Ok(operations)
    }

    fn plan_columns(&self, original: &Table, operations: &mut Vec<Operation>) -> Result<()> {
        let table = &self.pending.name;
        let mut order = ColumnOrder::new(
            original
                .columns
                .keys()
                .filter_map(|name| self.current_name(original, name)),
        );

        let mut previous: Option<&str> = None;
        for column in self.pending.columns.values() {
            let reference = self
                .original_name(original, &column.name)
                .and_then(|name| original.get_column(name));
            let position = order.place(&column.name, reference.is_some(), previous);
            previous = Some(column.name.as_str());

            let Some(reference) = reference else {
                self.record(
                    operations,
                    AddColumnOp {
                        table: table.clone(),
                        column: column.clone(),
                        position,
                    },
                )?;
                continue;
            };

            let renamed = reference.name != column.name;
            if position.is_some() || renamed || !column.options.agrees_with(&reference.options) {
                self.record(
                    operations,
                    ChangeColumnOp {
                        table: table.clone(),
                        name: reference.name.clone(),
                        new_name: renamed.then(|| column.name.clone()),
                        column: column.clone(),
                        previous: reference.options.clone(),
                        position,
                    },
                )?;
            }
        }
        Ok(())
    }

    /// Checks `operation` against the policy and appends it.
    fn record(&self, operations: &mut Vec<Operation>, operation: impl Into<Operation>) -> Result<()> {
        let operation = operation.into();
        if let Err(err) = self.policy.permit(&operation) {
            warn!(
                backend = self.policy.name(),
                operation = %operation.description(),
                error = %err,
                "Operation rejected by backend policy"
            );
            return Err(err);
        }
        debug!(operation = %operation.description(), "Planned operation");
        operations.push(operation);
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn ensure_alterable(&self) -> Result<()> {
        if self.dropped {
            return Err(AlterError::TableDropped(self.pending.name.clone()));
        }
        Ok(())
    }

    fn column_exists(&self, column: &str) -> AlterError {
        AlterError::ColumnExists {
            table: self.pending.name.clone(),
            column: column.to_string(),
        }
    }

    fn column_missing(&self, column: &str) -> AlterError {
        AlterError::ColumnMissing {
            table: self.pending.name.clone(),
            column: column.to_string(),
        }
    }

    /// Returns the pending index a column placed at `position` ends up at.
    /// `moving` is the column being placed, which cannot anchor itself.
    fn resolve_position(&self, position: &ColumnPosition, moving: Option<&str>) -> Result<usize> {
        match position {
            ColumnPosition::First => Ok(0),
            ColumnPosition::After(anchor) => {
                if moving == Some(anchor.as_str()) {
                    return Err(AlterError::InvalidRequest(format!(
                        "column '{anchor}' cannot be placed after itself"
                    )));
                }
                self.pending
                    .columns
                    .get_index_of(anchor)
                    .map(|index| index + 1)
                    .ok_or_else(|| self.column_missing(anchor))
            }
        }
    }

    fn record_rename(&mut self, from: &str, to: &str) {
        let source = self
            .renames
            .iter()
            .find(|(_, current)| current.as_str() == from)
            .map(|(original, _)| original.clone());

        match source {
            Some(original) if original == to => {
                self.renames.shift_remove(&original);
            }
            Some(original) => {
                self.renames.insert(original, to.to_string());
            }
            None => {
                let is_original = self
                    .original
                    .as_ref()
                    .is_some_and(|table| table.columns.contains_key(from));
                if is_original && !self.renames.contains_key(from) {
                    self.renames.insert(from.to_string(), to.to_string());
                }
            }
        }
    }

    fn rewrite_references(&mut self, from: &str, to: &str) {
        let rename = |columns: &mut Vec<String>| {
            for column in columns.iter_mut().filter(|column| column.as_str() == from) {
                *column = to.to_string();
            }
        };
        for index in self.pending.indexes.values_mut() {
            rename(&mut index.options.columns);
        }
        for foreign_key in self.pending.foreign_keys.values_mut() {
            rename(&mut foreign_key.options.columns);
        }
    }

    /// Returns the original name of a pending column, or `None` for a new
    /// column.
    fn original_name<'a>(&'a self, original: &'a Table, current: &'a str) -> Option<&'a str> {
        if let Some((name, _)) = self.renames.iter().find(|(_, name)| name.as_str() == current) {
            return Some(name.as_str());
        }
        if self.renames.contains_key(current) {
            return None;
        }
        original.columns.contains_key(current).then_some(current)
    }

    /// Returns the pending name of an original column, or `None` if it was
    /// dropped.
    fn current_name<'a>(&'a self, original: &'a Table, name: &'a str) -> Option<&'a str> {
        let current = self.renames.get(name).map_or(name, String::as_str);
        let survives = self.pending.columns.contains_key(current)
            && self.original_name(original, current) == Some(name);
        survives.then_some(current)
    }

    /// Translates original column names through the rename map.
    fn translate(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .map(|column| self.renames.get(column).unwrap_or(column).clone())
            .collect()
    }

    fn index_agrees(&self, pending: &Index, reference: &Index) -> bool {
        let mut reference = reference.clone();
        reference.options.columns = self.translate(&reference.options.columns);
        pending.agrees_with(&reference)
    }

    fn foreign_key_agrees(&self, pending: &ForeignKey, reference: &ForeignKey) -> bool {
        let mut reference = reference.clone();
        reference.options.columns = self.translate(&reference.options.columns);
        pending.agrees_with(&reference)
    }

    fn check_references(&self) -> Result<()> {
        let indexes = self
            .pending
            .indexes
            .values()
            .map(|index| (&index.name, &index.options.columns));
        let foreign_keys = self
            .pending
            .foreign_keys
            .values()
            .map(|foreign_key| (&foreign_key.name, &foreign_key.options.columns));

        for (entity, columns) in indexes.chain(foreign_keys) {
            if let Some(column) = columns
                .iter()
                .find(|column| !self.pending.columns.contains_key(column.as_str()))
            {
                return Err(AlterError::DanglingReference {
                    table: self.pending.name.clone(),
                    entity: entity.clone(),
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}
