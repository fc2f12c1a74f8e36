//! oxide-alter CLI
//!
//! Command-line tool for planning and applying table alterations.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use sqlx::sqlite::SqlitePoolOptions;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_alter::prelude::*;

/// Backend-aware table alteration planning.
#[derive(Parser)]
#[command(name = "oxide-alter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Schema snapshot file (JSON).
    #[arg(short, long, default_value = "schema.json")]
    schema: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the operations a request plans.
    Plan {
        /// Request file (JSON).
        #[arg(short, long)]
        request: PathBuf,

        /// Backend to plan for.
        #[arg(short, long, value_enum, default_value_t = Backend::Mysql)]
        dialect: Backend,

        /// Print rendered SQL instead of the operations as JSON.
        #[arg(long)]
        sql: bool,
    },

    /// Apply a request to a SQLite database and update the snapshot.
    Apply {
        /// Request file (JSON).
        #[arg(short, long)]
        request: PathBuf,

        /// Database URL (SQLite path or connection string).
        #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:db.sqlite3")]
        database: String,

        /// Show SQL without executing (dry run).
        #[arg(long)]
        dry_run: bool,
    },

    /// Show a table of the snapshot.
    Show {
        /// Table name.
        #[arg(short, long)]
        table: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Backend {
    Mysql,
    Sqlite,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut snapshot = load_snapshot(&cli.schema)?;

    match cli.command {
        Commands::Plan {
            request,
            dialect,
            sql,
        } => {
            let request = AlterRequest::load(&request)?;
            match dialect {
                Backend::Mysql => print_plan(&request, &snapshot, MysqlDialect::new(), sql)?,
                Backend::Sqlite => print_plan(&request, &snapshot, SqliteDialect::new(), sql)?,
            }
        }

        Commands::Apply {
            request,
            database,
            dry_run,
        } => {
            let request = AlterRequest::load(&request)?;
            let mut planner = request.planner(&snapshot, SqliteDialect::new())?;

            if dry_run {
                info!("Dry run mode - SQL will be printed but not executed.");
            }

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect(&database)
                .await?;
            let executor = SqliteExecutor::new(pool).dry_run(dry_run);
            let operations = planner.execute(&executor).await?;

            if operations.is_empty() {
                info!(table = %request.table, "No changes detected.");
            } else if !dry_run {
                snapshot.replace_table(&request.table, planner.original().cloned());
                snapshot.save(&cli.schema)?;
                info!(
                    table = %planner.name(),
                    operations = operations.len(),
                    schema = %cli.schema.display(),
                    "Applied request and updated snapshot"
                );
            }
        }

        Commands::Show { table } => match snapshot.get_table(&table) {
            Some(table) => println!("{}", serde_json::to_string_pretty(table)?),
            None => warn!(table = %table, "Table not found in snapshot"),
        },
    }

    Ok(())
}

/// Loads the snapshot, starting from an empty one if the file does not
/// exist yet.
fn load_snapshot(path: &Path) -> anyhow::Result<SchemaSnapshot> {
    if !path.exists() {
        warn!(path = %path.display(), "Schema snapshot not found, starting empty");
        return Ok(SchemaSnapshot::new());
    }
    Ok(SchemaSnapshot::load(path)?)
}

fn print_plan<D: StatementRenderer>(
    request: &AlterRequest,
    snapshot: &SchemaSnapshot,
    dialect: D,
    sql: bool,
) -> anyhow::Result<()> {
    let planner = request.planner(snapshot, dialect)?;
    let operations = planner.plan()?;

    if operations.is_empty() {
        info!(table = %request.table, "No changes detected.");
        return Ok(());
    }

    if sql {
        for operation in &operations {
            for statement in planner.policy().generate_sql(operation) {
                println!("{statement};");
            }
        }
    } else {
        println!("{}", serde_json::to_string_pretty(&operations)?);
    }
    Ok(())
}
