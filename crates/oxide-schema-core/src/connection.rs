//! Connection descriptors and grammar resolution.

use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;
use crate::grammar::{Grammar, MySqlGrammar, PostgresGrammar, SqlServerGrammar, SqliteGrammar};

/// The database families a blueprint can be compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// MySQL and MariaDB.
    MySql,
    /// PostgreSQL.
    Postgres,
    /// Microsoft SQL Server.
    SqlServer,
    /// SQLite.
    Sqlite,
}

impl Dialect {
    /// Returns the canonical dialect name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::SqlServer => "sqlserver",
            Self::Sqlite => "sqlite",
        }
    }

    /// Creates a fresh grammar for this dialect, with an empty table prefix.
    #[must_use]
    pub fn grammar(self) -> Box<dyn Grammar> {
        match self {
            Self::MySql => Box::new(MySqlGrammar::new()),
            Self::Postgres => Box::new(PostgresGrammar::new()),
            Self::SqlServer => Box::new(SqlServerGrammar::new()),
            Self::Sqlite => Box::new(SqliteGrammar::new()),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dialect {
    type Err = SchemaError;

    /// Resolves a driver or dialect identifier, case-insensitively.
    ///
    /// A DSN such as `mysql:host=localhost;dbname=app` resolves from the
    /// text before the first `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let driver = s.split(':').next().unwrap_or(s).trim().to_lowercase();
        match driver.as_str() {
            "mysql" | "mysqli" | "pdo_mysql" => Ok(Self::MySql),
            "pgsql" | "postgres" | "postgresql" | "pdo_pgsql" => Ok(Self::Postgres),
            "sqlsrv" | "sqlserver" | "mssql" | "pdo_sqlsrv" => Ok(Self::SqlServer),
            "sqlite" | "sqlite3" | "pdo_sqlite" => Ok(Self::Sqlite),
            _ => Err(SchemaError::UnsupportedDialect(s.to_string())),
        }
    }
}

/// Everything the compiler reads from a connection profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    /// Dialect used to select the grammar.
    pub dialect: Dialect,
    /// Default character set for created tables (MySQL).
    pub charset: Option<String>,
    /// Default collation for created tables (MySQL).
    pub collation: Option<String>,
    /// Database or schema name, used by existence queries.
    pub database: Option<String>,
    /// Prefix prepended to every table name.
    pub table_prefix: String,
}

impl ConnectionInfo {
    /// Creates a connection descriptor for a dialect.
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            charset: None,
            collation: None,
            database: None,
            table_prefix: String::new(),
        }
    }

    /// Sets the default character set.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = Some(charset.into());
        self
    }

    /// Sets the default collation.
    #[must_use]
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    /// Sets the database name.
    #[must_use]
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Sets the table prefix.
    #[must_use]
    pub fn table_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.table_prefix = prefix.into();
        self
    }

    /// Returns the grammar for this connection, configured with its table prefix.
    #[must_use]
    pub fn grammar(&self) -> Box<dyn Grammar> {
        let mut grammar = self.dialect.grammar();
        grammar.set_table_prefix(self.table_prefix.clone());
        grammar
    }
}
