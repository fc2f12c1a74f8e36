//! Schema introspection boundary.
//!
//! The planner does not read live databases itself. It is seeded through a
//! [`SchemaReader`], which returns the current shape of a table. The crate
//! ships [`SchemaSnapshot`], a reader backed by a JSON file that the CLI
//! keeps in sync with the tables it alters.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::schema::Table;

/// Reads the current shape of tables.
pub trait SchemaReader {
    /// Returns the table, or `None` if it does not exist.
    fn read_table(&self, name: &str) -> Result<Option<Table>>;
}

/// A set of table definitions, stored as JSON.
///
/// ```json
/// { "tables": [ { "name": "users", "columns": [ ... ] } ] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    /// Tables keyed by name.
    #[serde(default, with = "crate::schema::keyed")]
    pub tables: IndexMap<String, Table>,
}

impl SchemaSnapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table, replacing any table with the same name.
    #[must_use]
    pub fn table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Loads a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&content)?;
        debug!(path = %path.display(), tables = snapshot.tables.len(), "Loaded schema snapshot");
        Ok(snapshot)
    }

    /// Writes the snapshot to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!(path = %path.display(), tables = self.tables.len(), "Saved schema snapshot");
        Ok(())
    }

    /// Gets a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Records the outcome of an alteration of the table previously named
    /// `previous_name`: the table is replaced by `table` (keeping its place),
    /// or removed when `table` is `None`.
    pub fn replace_table(&mut self, previous_name: &str, table: Option<Table>) {
        let slot = self.tables.get_index_of(previous_name);
        self.tables.shift_remove(previous_name);
        if let Some(table) = table {
            let index = slot.unwrap_or(self.tables.len());
            self.tables.shift_insert(index, table.name.clone(), table);
        }
    }
}

impl SchemaReader for SchemaSnapshot {
    fn read_table(&self, name: &str) -> Result<Option<Table>> {
        Ok(self.tables.get(name).cloned())
    }
}
