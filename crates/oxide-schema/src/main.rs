//! oxide-schema CLI
//!
//! Command-line tool for running schema operations against a configured
//! connection profile.

use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use oxide_schema::{DatabaseConfig, Schema, SqliteExecutor, StdoutExecutor};
use oxide_schema_core::{Dialect, Executor};

/// Fluent schema builder for MySQL, PostgreSQL, SQL Server and SQLite.
#[derive(Parser)]
#[command(name = "oxide-schema")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Connection profile file (JSON).
    #[arg(short, long, env = "OXIDE_SCHEMA_CONFIG", default_value = "database.json")]
    config: PathBuf,

    /// Connection profile to use (the file's default if not specified).
    #[arg(short, long, env = "OXIDE_SCHEMA_PROFILE")]
    profile: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    /// Print SQL without executing it.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop a table.
    Drop {
        /// Table name.
        table: String,
    },

    /// Drop a table if it exists.
    DropIfExists {
        /// Table name.
        table: String,
    },

    /// Rename a table.
    Rename {
        /// Current table name.
        from: String,
        /// New table name.
        to: String,
    },

    /// Check whether a table exists.
    HasTable {
        /// Table name.
        table: String,
    },

    /// Check whether a table has a column.
    HasColumn {
        /// Table name.
        table: String,
        /// Column name (case-insensitive).
        column: String,
    },

    /// Drop one or more columns.
    DropColumn {
        /// Table name.
        table: String,
        /// Columns to drop.
        #[arg(required = true)]
        columns: Vec<String>,
    },

    /// Rename a column.
    RenameColumn {
        /// Table name.
        table: String,
        /// Current column name.
        from: String,
        /// New column name.
        to: String,
    },
}

fn main() -> anyhow::Result<()> {
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

    let config = DatabaseConfig::load(&cli.config)?;
    let profile = config.profile(cli.profile.as_deref())?;
    let connection = profile.connection_info()?;

    if connection.dialect == Dialect::Sqlite {
        let executor = SqliteExecutor::connect(&profile.url)?.dry_run(cli.dry_run);
        run(&Schema::new(connection, executor), cli.command)
    } else if cli.dry_run {
        info!("Dry run mode - SQL will be printed but not executed.");
        run(&Schema::new(connection, StdoutExecutor::new()), cli.command)
    } else {
        bail!(
            "{} connections are not supported; use --dry-run to print SQL",
            connection.dialect
        );
    }
}

fn run<E: Executor>(schema: &Schema<E>, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Drop { table } => schema.drop(&table)?,
        Commands::DropIfExists { table } => schema.drop_if_exists(&table)?,
        Commands::Rename { from, to } => schema.rename(&from, &to)?,
        Commands::HasTable { table } => {
            let exists = schema.has_table(&table)?;
            info!("Table {} exists: {}", table, exists);
        }
        Commands::HasColumn { table, column } => {
            let exists = schema.has_column(&table, &column)?;
            info!("Column {}.{} exists: {}", table, column, exists);
        }
        Commands::DropColumn { table, columns } => {
            schema.table(&table, |t| {
                t.drop_column(columns);
            })?;
        }
        Commands::RenameColumn { table, from, to } => {
            schema.table(&table, |t| {
                t.rename_column(from, to);
            })?;
        }
    }
    Ok(())
}
