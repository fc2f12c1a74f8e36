//! Error types for table alteration planning.

/// Errors that can occur while describing, planning or applying a table
/// alteration.
#[derive(Debug, thiserror::Error)]
pub enum AlterError {
    /// A column with this name already exists in the pending table.
    #[error("Column '{column}' already exists in table '{table}'")]
    ColumnExists {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// The column does not exist in the pending table.
    #[error("Column '{column}' does not exist in table '{table}'")]
    ColumnMissing {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// An index with this name already exists in the pending table.
    #[error("Index '{index}' already exists on table '{table}'")]
    IndexExists {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
    },

    /// The index does not exist in the pending table.
    #[error("Index '{index}' does not exist on table '{table}'")]
    IndexMissing {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
    },

    /// A foreign key with this name already exists in the pending table.
    #[error("Foreign key '{foreign_key}' already exists on table '{table}'")]
    ForeignKeyExists {
        /// Table name.
        table: String,
        /// Foreign key name.
        foreign_key: String,
    },

    /// The foreign key does not exist in the pending table.
    #[error("Foreign key '{foreign_key}' does not exist on table '{table}'")]
    ForeignKeyMissing {
        /// Table name.
        table: String,
        /// Foreign key name.
        foreign_key: String,
    },

    /// The table does not exist, so it cannot be dropped.
    #[error("Table '{0}' does not exist")]
    TableMissing(String),

    /// The table is already marked as dropped and cannot be altered.
    #[error("Table '{0}' is marked as dropped")]
    TableDropped(String),

    /// The backend cannot express the requested change.
    #[error("{backend} cannot alter '{entity}': {reason}")]
    UnsupportedOperation {
        /// Backend name.
        backend: String,
        /// Name of the column, index, foreign key or table involved.
        entity: String,
        /// Why the backend rejects it.
        reason: String,
    },

    /// An index or foreign key refers to a column that is not pending.
    #[error("'{entity}' on table '{table}' references missing column '{column}'")]
    DanglingReference {
        /// Table name.
        table: String,
        /// Index or foreign key name.
        entity: String,
        /// The column that is not in the pending table.
        column: String,
    },

    /// A request or snapshot file is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Database error while applying operations.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading/writing request or snapshot files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AlterError {
    /// Creates an [`AlterError::UnsupportedOperation`].
    #[must_use]
    pub fn unsupported(
        backend: impl Into<String>,
        entity: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedOperation {
            backend: backend.into(),
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    /// Returns true for errors raised because a backend cannot express a
    /// change, as opposed to mistakes in the requested change itself.
    #[must_use]
    pub fn is_capability_error(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

/// Result type for alteration operations.
pub type Result<T> = std::result::Result<T, AlterError>;
