//! Operation executor.
//!
//! This module applies planned operations against a database. A plan is
//! applied as a whole or not at all: [`SqliteExecutor`] runs every statement
//! of a plan inside one transaction.

use std::future::Future;

use sqlx::sqlite::SqlitePool;
use tracing::{debug, info, warn};

use crate::dialect::{SqliteDialect, StatementRenderer};
use crate::error::Result;
use crate::operation::Operation;

/// Runs planned operations against a backing store.
pub trait OperationExecutor: Send + Sync {
    /// Runs all operations atomically. An error means nothing was applied.
    fn run(&self, operations: &[Operation]) -> impl Future<Output = Result<()>> + Send;

    /// Returns false when a successful [`run`](Self::run) leaves the
    /// database untouched, as in a dry run.
    fn applies(&self) -> bool {
        true
    }
}

/// Executes operations against a SQLite database.
pub struct SqliteExecutor {
    pool: SqlitePool,
    dialect: SqliteDialect,
    dry_run: bool,
}

impl SqliteExecutor {
    /// Creates a new executor.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            dialect: SqliteDialect::new(),
            dry_run: false,
        }
    }

    /// Enables dry-run mode (SQL is printed but not executed).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Returns the connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &SqliteDialect {
        &self.dialect
    }

    /// Generates SQL for operations without executing them.
    #[must_use]
    pub fn sql_for(&self, operations: &[Operation]) -> Vec<String> {
        operations
            .iter()
            .flat_map(|operation| self.dialect.generate_sql(operation))
            .collect()
    }
}

impl OperationExecutor for SqliteExecutor {
    async fn run(&self, operations: &[Operation]) -> Result<()> {
        info!(operations = operations.len(), "Applying operations");

        if self.dry_run {
            for sql in self.sql_for(operations) {
                println!("{sql};");
            }
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for operation in operations {
            debug!(operation = %operation.description(), "Running operation");
            for sql in self.dialect.generate_sql(operation) {
                // Comments stand for changes SQLite has no statement for
                if sql.starts_with("--") {
                    warn!(comment = %sql, "Skipping comment (unsupported operation)");
                    continue;
                }
                debug!(sql = %sql, "Executing SQL");
                sqlx::query(&sql).execute(&mut *tx).await?;
            }
        }
        tx.commit().await?;

        info!("Operations applied successfully");
        Ok(())
    }

    fn applies(&self) -> bool {
        !self.dry_run
    }
}
