//! # oxide-schema-core
//!
//! Fluent table blueprints compiled to DDL for MySQL, PostgreSQL, SQL Server
//! and SQLite.
//!
//! This crate provides:
//! - A [`Blueprint`] that accumulates column definitions and structural
//!   commands for one table, and infers the commands implied by them
//! - A [`Grammar`] per dialect that compiles each command into ordered SQL
//! - Boundary traits ([`Executor`], [`Introspector`]) for running statements
//!   and reading the live schema
//!
//! Compilation is pure: [`Blueprint::to_sql`] never touches a database.
//!
//! ## Example
//!
//! ```rust
//! use oxide_schema_core::{Blueprint, ConnectionInfo, Dialect};
//!
//! let connection = ConnectionInfo::new(Dialect::MySql).charset("utf8");
//!
//! let mut users = Blueprint::new("users");
//! users.create();
//! users.increments("id");
//! users.string("email", 255);
//! users.timestamp("created_at").nullable();
//!
//! let sql = users.to_sql(&connection, connection.grammar().as_ref()).unwrap();
//! assert_eq!(
//!     sql,
//!     vec![
//!         "create table `users` (`id` int unsigned auto_increment primary key, \
//!          `email` varchar(255) not null, `created_at` timestamp null) \
//!          default character set utf8"
//!     ]
//! );
//! ```
//!
//! ## Dialect selection
//!
//! Driver names resolve case-insensitively, aliases included:
//!
//! ```rust
//! use oxide_schema_core::Dialect;
//!
//! assert_eq!("mysqli".parse::<Dialect>().unwrap(), Dialect::MySql);
//! assert_eq!("PostgreSQL".parse::<Dialect>().unwrap(), Dialect::Postgres);
//! assert!("oracle".parse::<Dialect>().is_err());
//! ```

pub mod blueprint;
pub mod connection;
pub mod error;
pub mod executor;
pub mod grammar;
pub mod introspect;

pub use blueprint::{
    Blueprint, ColumnSpec, ColumnType, Command, DefaultChange, DefaultValue, ForeignKeyCommand,
    IndexCommand, IndexMarker, IndexRef, IntoColumns,
};
pub use connection::{ConnectionInfo, Dialect};
pub use error::{Result, SchemaError};
pub use executor::{Executor, Row};
pub use grammar::{
    CompileContext, Grammar, Modifier, MySqlGrammar, PostgresGrammar, SqlServerGrammar,
    SqliteGrammar,
};
pub use introspect::{ColumnMetadata, Introspector, TableDiff};
