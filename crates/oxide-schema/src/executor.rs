//! Statement executors.
//!
//! [`SqliteExecutor`] runs statements through a `sqlx` pool on its own
//! current-thread runtime and reads column metadata with `pragma table_info`.
//! [`StdoutExecutor`] prints statements for dialects the runner cannot
//! connect to.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row as _;
use tokio::runtime::{Builder, Runtime};
use tracing::{debug, info};

use oxide_schema_core::{
    ColumnMetadata, Dialect, Executor, Introspector, Row, SchemaError, TableDiff,
};

use crate::error::Result;
use crate::platform;

// =============================================================================
// SQLite
// =============================================================================

/// Executes statements against a SQLite database.
pub struct SqliteExecutor {
    pool: SqlitePool,
    runtime: Runtime,
    dry_run: bool,
}

impl SqliteExecutor {
    /// Connects to a SQLite URL (`sqlite:app.db`, `:memory:`), creating the
    /// file if it is missing.
    pub fn connect(url: &str) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // A single long-lived connection keeps `:memory:` databases alive.
        let pool = runtime.block_on(
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options),
        )?;
        info!(url = %url, "Connected to SQLite");

        Ok(Self {
            pool,
            runtime,
            dry_run: false,
        })
    }

    /// Prints statements instead of executing them. Queries still run.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Returns `true` if statements are printed instead of executed.
    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Names of the `create index` indexes that include a column.
    fn indexes_covering(&self, table: &str, column: &str) -> oxide_schema_core::Result<Vec<String>> {
        let rows: Vec<(String,)> = self
            .runtime
            .block_on(
                sqlx::query_as(
                    "select il.name from pragma_index_list(?) as il, pragma_index_info(il.name) as ii \
                     where il.origin = 'c' and ii.name = ?",
                )
                .bind(table)
                .bind(column)
                .fetch_all(&self.pool),
            )
            .map_err(|e| SchemaError::Introspection(e.to_string()))?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    fn execution_error(sql: &str, err: &sqlx::Error) -> SchemaError {
        SchemaError::Execution {
            statement: sql.to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

/// Renders every value of a row as text.
fn decode_row(row: &SqliteRow) -> Row {
    (0..row.len())
        .map(|i| {
            if let Ok(value) = row.try_get::<Option<String>, _>(i) {
                return value;
            }
            if let Ok(value) = row.try_get::<Option<i64>, _>(i) {
                return value.map(|v| v.to_string());
            }
            if let Ok(value) = row.try_get::<Option<f64>, _>(i) {
                return value.map(|v| v.to_string());
            }
            row.try_get_unchecked::<Option<String>, _>(i).ok().flatten()
        })
        .collect()
}

impl Executor for SqliteExecutor {
    fn query(&self, sql: &str, bindings: &[&str]) -> oxide_schema_core::Result<Vec<Row>> {
        debug!(sql = %sql, bindings = ?bindings, "Running query");

        let rows = self
            .runtime
            .block_on(async {
                let mut query = sqlx::query(sql);
                for binding in bindings {
                    query = query.bind(*binding);
                }
                query.fetch_all(&self.pool).await
            })
            .map_err(|e| Self::execution_error(sql, &e))?;

        Ok(rows.iter().map(decode_row).collect())
    }

    fn execute(&self, sql: &str) -> oxide_schema_core::Result<()> {
        if self.dry_run {
            println!("{sql};");
            return Ok(());
        }

        self.runtime
            .block_on(sqlx::query(sql).execute(&self.pool))
            .map_err(|e| Self::execution_error(sql, &e))?;
        Ok(())
    }

    fn introspector(&self) -> Option<&dyn Introspector> {
        Some(self)
    }
}

impl Introspector for SqliteExecutor {
    fn describe_table(&self, table: &str) -> oxide_schema_core::Result<Vec<ColumnMetadata>> {
        let sql = format!("pragma table_info(\"{}\")", table.replace('"', "\"\""));
        debug!(sql = %sql, "Describing table");

        let rows: Vec<(i64, String, String, i64, Option<String>, i64)> = self
            .runtime
            .block_on(sqlx::query_as(&sql).fetch_all(&self.pool))
            .map_err(|e| SchemaError::Introspection(e.to_string()))?;

        if rows.is_empty() {
            return Err(SchemaError::Introspection(format!(
                "table {table} does not exist"
            )));
        }

        Ok(rows
            .into_iter()
            .map(|(_, name, native_type, not_null, default, pk)| ColumnMetadata {
                name,
                native_type,
                nullable: not_null == 0,
                default,
                primary_key: pk > 0,
            })
            .collect())
    }

    /// Explicit indexes on removed columns are dropped first; SQLite refuses
    /// to drop an indexed column.
    fn alter_table_sql(&self, diff: &TableDiff) -> oxide_schema_core::Result<Vec<String>> {
        let mut statements = Vec::new();
        for (column, _) in &diff.removed_columns {
            for index in self.indexes_covering(&diff.table, column)? {
                let sql = format!("drop index \"{}\"", index.replace('"', "\"\""));
                if !statements.contains(&sql) {
                    statements.push(sql);
                }
            }
        }
        statements.extend(platform::alter_table_sql(Dialect::Sqlite, diff));
        Ok(statements)
    }
}

// =============================================================================
// Stdout
// =============================================================================

/// Prints statements terminated by `;` instead of executing them.
///
/// Queries print too and return no rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutExecutor;

impl StdoutExecutor {
    /// Creates a new stdout executor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Executor for StdoutExecutor {
    fn query(&self, sql: &str, bindings: &[&str]) -> oxide_schema_core::Result<Vec<Row>> {
        if bindings.is_empty() {
            println!("{sql};");
        } else {
            println!("{sql}; -- {}", bindings.join(", "));
        }
        Ok(Vec::new())
    }

    fn execute(&self, sql: &str) -> oxide_schema_core::Result<()> {
        println!("{sql};");
        Ok(())
    }
}
