//! # oxide-schema
//!
//! Runs `oxide-schema-core` blueprints against a database.
//!
//! This crate provides:
//! - Connection profiles loaded from JSON ([`config`])
//! - A [`Schema`] facade that builds one blueprint per operation and runs it
//! - A SQLite executor and introspector backed by `sqlx`
//! - ALTER rendering for table diffs on every dialect ([`platform`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use oxide_schema::{Schema, SqliteExecutor};
//! use oxide_schema_core::{ConnectionInfo, Dialect};
//!
//! # fn main() -> oxide_schema::Result<()> {
//! let executor = SqliteExecutor::connect("sqlite:app.db")?;
//! let schema = Schema::new(ConnectionInfo::new(Dialect::Sqlite), executor);
//!
//! schema.create("users", |table| {
//!     table.increments("id");
//!     table.string("email", 255).unique();
//!     table.timestamps();
//! })?;
//!
//! assert!(schema.has_table("users")?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod platform;

use tracing::info;

use oxide_schema_core::{Blueprint, CompileContext, ConnectionInfo, Executor, Grammar};

pub use config::{ConnectionProfile, DatabaseConfig};
pub use error::{Result, RunnerError};
pub use executor::{SqliteExecutor, StdoutExecutor};

/// Schema operations against one connection.
pub struct Schema<E> {
    connection: ConnectionInfo,
    grammar: Box<dyn Grammar>,
    executor: E,
}

impl<E: Executor> Schema<E> {
    /// Creates a schema facade. The grammar is resolved from the connection.
    pub fn new(connection: ConnectionInfo, executor: E) -> Self {
        let grammar = connection.grammar();
        Self {
            connection,
            grammar,
            executor,
        }
    }

    /// Returns the connection descriptor.
    pub fn connection(&self) -> &ConnectionInfo {
        &self.connection
    }

    /// Returns the resolved grammar.
    pub fn grammar(&self) -> &dyn Grammar {
        self.grammar.as_ref()
    }

    /// Returns the executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    fn run(&self, blueprint: Blueprint) -> Result<()> {
        blueprint.build(&self.connection, self.grammar.as_ref(), &self.executor)?;
        Ok(())
    }

    /// Modifies an existing table.
    pub fn table(&self, table: &str, define: impl FnOnce(&mut Blueprint)) -> Result<()> {
        info!(table = %table, "Altering table");
        let mut blueprint = Blueprint::new(table);
        define(&mut blueprint);
        self.run(blueprint)
    }

    /// Creates a table.
    pub fn create(&self, table: &str, define: impl FnOnce(&mut Blueprint)) -> Result<()> {
        info!(table = %table, "Creating table");
        let mut blueprint = Blueprint::new(table);
        blueprint.create();
        define(&mut blueprint);
        self.run(blueprint)
    }

    /// Drops a table.
    pub fn drop(&self, table: &str) -> Result<()> {
        info!(table = %table, "Dropping table");
        let mut blueprint = Blueprint::new(table);
        blueprint.drop();
        self.run(blueprint)
    }

    /// Drops a table if it exists.
    pub fn drop_if_exists(&self, table: &str) -> Result<()> {
        info!(table = %table, "Dropping table if exists");
        let mut blueprint = Blueprint::new(table);
        blueprint.drop_if_exists();
        self.run(blueprint)
    }

    /// Renames a table.
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        info!(from = %from, to = %to, "Renaming table");
        let mut blueprint = Blueprint::new(from);
        blueprint.rename(to);
        self.run(blueprint)
    }

    fn query(&self, (sql, bindings): (String, Vec<String>)) -> Result<Vec<oxide_schema_core::Row>> {
        let bindings: Vec<&str> = bindings.iter().map(String::as_str).collect();
        Ok(self.executor.query(&sql, &bindings)?)
    }

    /// Returns `true` if the table exists.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        let rows = self.query(
            self.grammar
                .compile_table_exists(table, self.connection.database.as_deref()),
        )?;
        Ok(!rows.is_empty())
    }

    /// Returns the column names of a table.
    pub fn column_listing(&self, table: &str) -> Result<Vec<String>> {
        let rows = self.query(
            self.grammar
                .compile_column_listing(table, self.connection.database.as_deref()),
        )?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.into_iter().next().flatten())
            .collect())
    }

    /// Returns `true` if the table has the column. Names compare
    /// case-insensitively.
    pub fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        let column = column.to_lowercase();
        Ok(self
            .column_listing(table)?
            .iter()
            .any(|c| c.to_lowercase() == column))
    }

    /// Compiles a table blueprint without executing it.
    ///
    /// Uses the executor's introspector when it has one, so renames and
    /// SQLite column drops compile against the live schema.
    pub fn to_sql(&self, table: &str, define: impl FnOnce(&mut Blueprint)) -> Result<Vec<String>> {
        let mut blueprint = Blueprint::new(table);
        define(&mut blueprint);

        let mut ctx = CompileContext::new(&self.connection);
        if let Some(introspector) = self.executor.introspector() {
            ctx = ctx.with_introspector(introspector);
        }
        Ok(blueprint.compile(self.grammar.as_ref(), &ctx)?)
    }
}

impl Schema<SqliteExecutor> {
    /// Connects to a SQLite profile.
    ///
    /// Fails with [`RunnerError::InvalidConfig`] if the profile targets
    /// another dialect.
    pub fn from_profile(config: &DatabaseConfig, name: Option<&str>) -> Result<Self> {
        let profile = config.profile(name)?;
        let connection = profile.connection_info()?;
        if connection.dialect != oxide_schema_core::Dialect::Sqlite {
            return Err(RunnerError::InvalidConfig(format!(
                "cannot connect to {} databases; use --dry-run",
                connection.dialect
            )));
        }
        let executor = SqliteExecutor::connect(&profile.url)?;
        Ok(Self::new(connection, executor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_schema_core::{Dialect, SchemaError};

    fn schema() -> Schema<SqliteExecutor> {
        Schema::new(
            ConnectionInfo::new(Dialect::Sqlite),
            SqliteExecutor::connect(":memory:").unwrap(),
        )
    }

    fn create_users(schema: &Schema<SqliteExecutor>) {
        schema
            .create("users", |t| {
                t.increments("id");
                t.string("email", 255).unique();
                t.string("name", 100).nullable();
            })
            .unwrap();
    }

    #[test]
    fn test_create_and_has_table() {
        let schema = schema();
        assert!(!schema.has_table("users").unwrap());
        create_users(&schema);
        assert!(schema.has_table("users").unwrap());
    }

    #[test]
    fn test_column_listing_and_has_column() {
        let schema = schema();
        create_users(&schema);

        assert_eq!(schema.column_listing("users").unwrap(), vec!["id", "email", "name"]);
        assert!(schema.has_column("users", "EMAIL").unwrap());
        assert!(!schema.has_column("users", "missing").unwrap());
    }

    #[test]
    fn test_table_adds_columns() {
        let schema = schema();
        create_users(&schema);
        schema
            .table("users", |t| {
                t.integer("age").nullable();
            })
            .unwrap();
        assert!(schema.has_column("users", "age").unwrap());
    }

    #[test]
    fn test_rename_and_drop() {
        let schema = schema();
        create_users(&schema);

        schema.rename("users", "members").unwrap();
        assert!(!schema.has_table("users").unwrap());
        assert!(schema.has_table("members").unwrap());

        schema.drop("members").unwrap();
        assert!(!schema.has_table("members").unwrap());
        schema.drop_if_exists("members").unwrap();
    }

    #[test]
    fn test_drop_missing_table_fails() {
        let err = schema().drop("missing").unwrap_err();
        assert!(matches!(err, RunnerError::Schema(SchemaError::Execution { .. })));
    }

    #[test]
    fn test_rename_column_through_introspection() {
        let schema = schema();
        create_users(&schema);

        assert_eq!(
            schema
                .to_sql("users", |t| {
                    t.rename_column("name", "full_name");
                })
                .unwrap(),
            vec!["alter table \"users\" rename column \"name\" to \"full_name\""]
        );

        schema
            .table("users", |t| {
                t.rename_column("name", "full_name");
            })
            .unwrap();
        assert_eq!(
            schema.column_listing("users").unwrap(),
            vec!["id", "email", "full_name"]
        );
    }

    #[test]
    fn test_drop_column_through_introspection() {
        let schema = schema();
        create_users(&schema);

        schema
            .table("users", |t| {
                t.drop_column("name");
            })
            .unwrap();
        assert_eq!(schema.column_listing("users").unwrap(), vec!["id", "email"]);
    }

    #[test]
    fn test_drop_indexed_column() {
        let schema = schema();
        create_users(&schema);

        schema
            .table("users", |t| {
                t.drop_column("email");
            })
            .unwrap();

        assert_eq!(schema.column_listing("users").unwrap(), vec!["id", "name"]);
        let indexes = schema
            .executor()
            .query("select name from sqlite_master where type = 'index' and name = ?", &["users_email_unique"])
            .unwrap();
        assert!(indexes.is_empty());
    }

    #[test]
    fn test_table_prefix() {
        let schema = Schema::new(
            ConnectionInfo::new(Dialect::Sqlite).table_prefix("app_"),
            SqliteExecutor::connect(":memory:").unwrap(),
        );
        schema
            .create("posts", |t| {
                t.increments("id");
            })
            .unwrap();

        assert!(schema.has_table("posts").unwrap());
        let rows = schema
            .executor()
            .query("select name from sqlite_master where name = ?", &["app_posts"])
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_stdout_schema_prints() {
        let schema = Schema::new(ConnectionInfo::new(Dialect::Postgres), StdoutExecutor::new());
        schema.drop("users").unwrap();
        assert!(!schema.has_table("users").unwrap());
        assert_eq!(schema.grammar().dialect(), Dialect::Postgres);
    }

    #[test]
    fn test_from_profile() {
        let config = DatabaseConfig::from_json(
            r#"{ "default": "mem", "profiles": {
                "mem": { "dialect": "sqlite", "url": ":memory:" },
                "pg": { "dialect": "pgsql", "url": "postgres://localhost/app" }
            } }"#,
        )
        .unwrap();

        let schema = Schema::from_profile(&config, None).unwrap();
        assert_eq!(schema.connection().dialect, Dialect::Sqlite);

        assert!(matches!(
            Schema::from_profile(&config, Some("pg")),
            Err(RunnerError::InvalidConfig(_))
        ));
    }
}
