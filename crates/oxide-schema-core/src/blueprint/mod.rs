//! Table blueprints.
//!
//! A [`Blueprint`] describes one pending structural change to one table. It
//! accumulates column definitions and commands through a fluent API, derives
//! the commands implied by that state, and hands every command to a
//! [`Grammar`] to be compiled into SQL.
//!
//! # Example
//!
//! ```rust
//! use oxide_schema_core::{Blueprint, ConnectionInfo, Dialect};
//!
//! let mut table = Blueprint::new("users");
//! table.create();
//! table.increments("id");
//! table.string("email", 255).unique();
//! table.timestamp("created_at").nullable();
//!
//! let connection = ConnectionInfo::new(Dialect::Postgres);
//! let statements = table.to_sql(&connection, connection.grammar().as_ref()).unwrap();
//!
//! assert_eq!(
//!     statements,
//!     vec![
//!         "create table \"users\" (\"id\" serial primary key, \"email\" varchar(255) not null, \"created_at\" timestamp null)",
//!         "create unique index \"users_email_unique\" on \"users\" (\"email\")",
//!     ]
//! );
//! ```

mod column;
mod command;

pub use column::{ColumnSpec, ColumnType, DefaultValue, IndexMarker};
pub use command::{
    Command, DefaultChange, ForeignKeyCommand, IndexCommand, IndexRef, IntoColumns,
};

use tracing::{debug, trace, warn};

use crate::connection::ConnectionInfo;
use crate::error::{Result, SchemaError};
use crate::executor::Executor;
use crate::grammar::{CompileContext, Grammar};

/// Kinds of index a blueprint can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IndexKind {
    Primary,
    Unique,
    Index,
    Foreign,
}

impl IndexKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Unique => "unique",
            Self::Index => "index",
            Self::Foreign => "foreign",
        }
    }
}

/// Accumulated columns and commands for one table operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Blueprint {
    table: String,
    columns: Vec<ColumnSpec>,
    commands: Vec<Command>,
    engine: Option<String>,
}

impl Blueprint {
    /// Creates an empty blueprint for the given table.
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            commands: Vec::new(),
            engine: None,
        }
    }

    /// Returns the table the blueprint describes.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Returns the columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    /// Returns the commands in execution order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Returns the storage engine, if one was set.
    #[must_use]
    pub fn engine(&self) -> Option<&str> {
        self.engine.as_deref()
    }

    /// Sets the storage engine used when the table is created (MySQL).
    pub fn set_engine(&mut self, engine: impl Into<String>) -> &mut Self {
        self.engine = Some(engine.into());
        self
    }

    // =========================================================================
    // Table commands
    // =========================================================================

    /// Indicates that the table needs to be created.
    pub fn create(&mut self) -> &mut Self {
        self.commands.push(Command::Create);
        self
    }

    /// Indicates that the table should be dropped.
    pub fn drop(&mut self) -> &mut Self {
        self.commands.push(Command::Drop);
        self
    }

    /// Indicates that the table should be dropped if it exists.
    pub fn drop_if_exists(&mut self) -> &mut Self {
        self.commands.push(Command::DropIfExists);
        self
    }

    /// Renames the table.
    pub fn rename(&mut self, to: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Rename { to: to.into() });
        self
    }

    /// Indicates that the given columns should be dropped.
    pub fn drop_column(&mut self, columns: impl IntoColumns) -> &mut Self {
        self.commands.push(Command::DropColumn {
            columns: columns.into_columns(),
        });
        self
    }

    /// Indicates that a column should be renamed.
    pub fn rename_column(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.commands.push(Command::RenameColumn {
            from: from.into(),
            to: to.into(),
        });
        self
    }

    /// Indicates that a column should be redefined.
    ///
    /// Returns the new definition so modifiers can be applied to it.
    pub fn modify_column(&mut self, name: impl Into<String>, column_type: ColumnType) -> &mut ColumnSpec {
        let idx = self.commands.len();
        self.commands.push(Command::ModifyColumn {
            column: ColumnSpec::new(name, column_type),
        });
        match &mut self.commands[idx] {
            Command::ModifyColumn { column } => column,
            _ => unreachable!("a modify_column command was just pushed"),
        }
    }

    /// Changes whether an existing column accepts NULL.
    pub fn modify_nullable(&mut self, column: impl Into<String>, nullable: bool) -> &mut Self {
        self.commands.push(Command::ModifyNullable {
            column: column.into(),
            nullable,
        });
        self
    }

    /// Sets or drops the default of an existing column.
    pub fn modify_default(&mut self, column: impl Into<String>, change: DefaultChange) -> &mut Self {
        self.commands.push(Command::ModifyDefault {
            column: column.into(),
            change,
        });
        self
    }

    /// Drops the `created_at` and `updated_at` columns.
    pub fn drop_timestamps(&mut self) -> &mut Self {
        self.drop_column(["created_at", "updated_at"])
    }

    /// Drops the `deleted_at` column.
    pub fn drop_soft_deletes(&mut self) -> &mut Self {
        self.drop_column("deleted_at")
    }

    // =========================================================================
    // Index commands
    // =========================================================================

    /// Specifies the primary key of the table.
    pub fn primary(&mut self, columns: impl IntoColumns) -> &mut Self {
        let columns = columns.into_columns();
        let index = self.index_name(IndexKind::Primary, &columns);
        self.commands
            .push(Command::Primary(IndexCommand { index, columns }));
        self
    }

    /// Specifies a named primary key.
    pub fn primary_named(&mut self, columns: impl IntoColumns, name: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Primary(IndexCommand {
            index: name.into(),
            columns: columns.into_columns(),
        }));
        self
    }

    /// Specifies a unique index.
    pub fn unique(&mut self, columns: impl IntoColumns) -> &mut Self {
        let columns = columns.into_columns();
        let index = self.index_name(IndexKind::Unique, &columns);
        self.commands
            .push(Command::Unique(IndexCommand { index, columns }));
        self
    }

    /// Specifies a named unique index.
    pub fn unique_named(&mut self, columns: impl IntoColumns, name: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Unique(IndexCommand {
            index: name.into(),
            columns: columns.into_columns(),
        }));
        self
    }

    /// Specifies a plain index.
    pub fn index(&mut self, columns: impl IntoColumns) -> &mut Self {
        let columns = columns.into_columns();
        let index = self.index_name(IndexKind::Index, &columns);
        self.commands
            .push(Command::Index(IndexCommand { index, columns }));
        self
    }

    /// Specifies a named plain index.
    pub fn index_named(&mut self, columns: impl IntoColumns, name: impl Into<String>) -> &mut Self {
        self.commands.push(Command::Index(IndexCommand {
            index: name.into(),
            columns: columns.into_columns(),
        }));
        self
    }

    /// Specifies a foreign key.
    ///
    /// Returns the command so the target can be set with
    /// [`ForeignKeyCommand::references`] and [`ForeignKeyCommand::on`].
    pub fn foreign(&mut self, columns: impl IntoColumns) -> &mut ForeignKeyCommand {
        let columns = columns.into_columns();
        let index = self.index_name(IndexKind::Foreign, &columns);
        self.push_foreign(ForeignKeyCommand::new(index, columns))
    }

    /// Specifies a named foreign key.
    pub fn foreign_named(
        &mut self,
        columns: impl IntoColumns,
        name: impl Into<String>,
    ) -> &mut ForeignKeyCommand {
        self.push_foreign(ForeignKeyCommand::new(name, columns.into_columns()))
    }

    fn push_foreign(&mut self, command: ForeignKeyCommand) -> &mut ForeignKeyCommand {
        let idx = self.commands.len();
        self.commands.push(Command::Foreign(command));
        match &mut self.commands[idx] {
            Command::Foreign(fk) => fk,
            _ => unreachable!("a foreign command was just pushed"),
        }
    }

    /// Drops the primary key, by name or by its columns.
    pub fn drop_primary(&mut self, index: impl Into<IndexRef>) -> &mut Self {
        let command = self.drop_index_command(IndexKind::Primary, index.into());
        self.commands.push(Command::DropPrimary(command));
        self
    }

    /// Drops a unique index, by name or by its columns.
    pub fn drop_unique(&mut self, index: impl Into<IndexRef>) -> &mut Self {
        let command = self.drop_index_command(IndexKind::Unique, index.into());
        self.commands.push(Command::DropUnique(command));
        self
    }

    /// Drops a plain index, by name or by its columns.
    pub fn drop_index(&mut self, index: impl Into<IndexRef>) -> &mut Self {
        let command = self.drop_index_command(IndexKind::Index, index.into());
        self.commands.push(Command::DropIndex(command));
        self
    }

    /// Drops a foreign key, by name or by its columns.
    pub fn drop_foreign(&mut self, index: impl Into<IndexRef>) -> &mut Self {
        let command = self.drop_index_command(IndexKind::Foreign, index.into());
        self.commands.push(Command::DropForeign(command));
        self
    }

    fn drop_index_command(&self, kind: IndexKind, index: IndexRef) -> IndexCommand {
        match index {
            IndexRef::Name(index) => IndexCommand {
                index,
                columns: Vec::new(),
            },
            IndexRef::Columns(columns) => IndexCommand {
                index: self.index_name(kind, &columns),
                columns,
            },
        }
    }

    /// Builds the conventional index name for this table.
    ///
    /// `{table}_{columns joined by _}_{kind}`, lowercased, with `-` and `.`
    /// replaced by `_`.
    fn index_name(&self, kind: IndexKind, columns: &[String]) -> String {
        format!("{}_{}_{}", self.table, columns.join("_"), kind.as_str())
            .to_lowercase()
            .replace(['-', '.'], "_")
    }

    // =========================================================================
    // Columns
    // =========================================================================

    fn add_column(&mut self, column: ColumnSpec) -> &mut ColumnSpec {
        let idx = self.columns.len();
        self.columns.push(column);
        &mut self.columns[idx]
    }

    /// Removes a previously added column. Does nothing if it is absent.
    pub fn remove_column(&mut self, name: &str) -> &mut Self {
        self.columns.retain(|c| c.name != name);
        self
    }

    /// Adds an auto-incrementing unsigned integer column.
    pub fn increments(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.unsigned_integer(name).auto_increment()
    }

    /// Adds an auto-incrementing unsigned big integer column.
    pub fn big_increments(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.unsigned_big_integer(name).auto_increment()
    }

    /// Adds a char column.
    pub fn char(&mut self, name: impl Into<String>, length: u32) -> &mut ColumnSpec {
        let mut column = ColumnSpec::new(name, ColumnType::Char);
        column.length = Some(length);
        self.add_column(column)
    }

    /// Adds a string (varchar) column.
    pub fn string(&mut self, name: impl Into<String>, length: u32) -> &mut ColumnSpec {
        let mut column = ColumnSpec::new(name, ColumnType::String);
        column.length = Some(length);
        self.add_column(column)
    }

    /// Adds a text column.
    pub fn text(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Text))
    }

    /// Adds a medium text column.
    pub fn medium_text(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::MediumText))
    }

    /// Adds a long text column.
    pub fn long_text(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::LongText))
    }

    /// Adds a JSON column.
    pub fn json(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Json))
    }

    /// Adds an integer column.
    pub fn integer(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Integer))
    }

    /// Adds a big integer column.
    pub fn big_integer(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::BigInteger))
    }

    /// Adds a medium integer column.
    pub fn medium_integer(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::MediumInteger))
    }

    /// Adds a small integer column.
    pub fn small_integer(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::SmallInteger))
    }

    /// Adds a tiny integer column.
    pub fn tiny_integer(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::TinyInteger))
    }

    /// Adds an unsigned integer column.
    pub fn unsigned_integer(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.integer(name).unsigned()
    }

    /// Adds an unsigned big integer column.
    pub fn unsigned_big_integer(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.big_integer(name).unsigned()
    }

    /// Adds a float column with the given total and decimal digits.
    pub fn float(&mut self, name: impl Into<String>, total: u32, places: u32) -> &mut ColumnSpec {
        let mut column = ColumnSpec::new(name, ColumnType::Float);
        column.total = Some(total);
        column.places = Some(places);
        self.add_column(column)
    }

    /// Adds a double column without explicit precision.
    pub fn double(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Double))
    }

    /// Adds a double column with the given total and decimal digits.
    pub fn double_with_precision(
        &mut self,
        name: impl Into<String>,
        total: u32,
        places: u32,
    ) -> &mut ColumnSpec {
        let mut column = ColumnSpec::new(name, ColumnType::Double);
        column.total = Some(total);
        column.places = Some(places);
        self.add_column(column)
    }

    /// Adds a decimal column with the given total and decimal digits.
    pub fn decimal(&mut self, name: impl Into<String>, total: u32, places: u32) -> &mut ColumnSpec {
        let mut column = ColumnSpec::new(name, ColumnType::Decimal);
        column.total = Some(total);
        column.places = Some(places);
        self.add_column(column)
    }

    /// Adds a boolean column.
    pub fn boolean(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Boolean))
    }

    /// Adds an enum column restricted to the given values.
    pub fn enumeration(&mut self, name: impl Into<String>, allowed: impl IntoColumns) -> &mut ColumnSpec {
        let mut column = ColumnSpec::new(name, ColumnType::Enum);
        column.allowed = allowed.into_columns();
        self.add_column(column)
    }

    /// Adds a date column.
    pub fn date(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Date))
    }

    /// Adds a date-time column.
    pub fn datetime(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::DateTime))
    }

    /// Adds a time column.
    pub fn time(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Time))
    }

    /// Adds a timestamp column.
    pub fn timestamp(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Timestamp))
    }

    /// Adds `created_at` and `updated_at` timestamps.
    pub fn timestamps(&mut self) -> &mut Self {
        self.timestamp("created_at");
        self.timestamp("updated_at");
        self
    }

    /// Adds nullable `created_at` and `updated_at` timestamps.
    pub fn nullable_timestamps(&mut self) -> &mut Self {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
        self
    }

    /// Adds a nullable `deleted_at` timestamp.
    pub fn soft_deletes(&mut self) -> &mut Self {
        self.timestamp("deleted_at").nullable();
        self
    }

    /// Adds a binary column.
    pub fn binary(&mut self, name: impl Into<String>) -> &mut ColumnSpec {
        self.add_column(ColumnSpec::new(name, ColumnType::Binary))
    }

    /// Adds the `{name}_id` and `{name}_type` columns of a polymorphic relation.
    pub fn morphs(&mut self, name: &str) -> &mut Self {
        self.unsigned_integer(format!("{name}_id"));
        self.string(format!("{name}_type"), 255);
        self
    }

    // =========================================================================
    // Compilation
    // =========================================================================

    fn creating(&self) -> bool {
        self.commands.iter().any(|c| matches!(c, Command::Create))
    }

    /// Derives the commands implied by the accumulated state.
    ///
    /// An `add` command goes first when columns were declared outside a
    /// `create`; every inline index marker becomes an index command, at most
    /// one per column, checked in the order primary, unique, index.
    fn add_implied_commands(&mut self) {
        if !self.columns.is_empty() && !self.creating() {
            self.commands.insert(0, Command::Add);
        }

        let fluent: Vec<(IndexKind, String, Option<String>)> = self
            .columns
            .iter()
            .filter_map(|column| {
                [
                    (IndexKind::Primary, &column.primary),
                    (IndexKind::Unique, &column.unique),
                    (IndexKind::Index, &column.index),
                ]
                .into_iter()
                .find_map(|(kind, marker)| {
                    marker.as_ref().map(|m| {
                        (kind, column.name.clone(), m.name().map(str::to_string))
                    })
                })
            })
            .collect();

        for (kind, column, name) in fluent {
            match (kind, name) {
                (IndexKind::Primary, None) => self.primary(column),
                (IndexKind::Primary, Some(name)) => self.primary_named(column, name),
                (IndexKind::Unique, None) => self.unique(column),
                (IndexKind::Unique, Some(name)) => self.unique_named(column, name),
                (IndexKind::Index | IndexKind::Foreign, None) => self.index(column),
                (IndexKind::Index | IndexKind::Foreign, Some(name)) => {
                    self.index_named(column, name)
                }
            };
        }
    }

    /// Checks every declared and modified column before compiling.
    fn validate(&self) -> Result<()> {
        let modified = self.commands.iter().filter_map(|command| match command {
            Command::ModifyColumn { column } => Some(column),
            _ => None,
        });
        for column in self.columns.iter().chain(modified) {
            if let Some(reason) = column.invalid_reason() {
                return Err(SchemaError::InvalidColumn {
                    table: self.table.clone(),
                    column: column.name.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }

    /// Compiles the blueprint without schema introspection.
    ///
    /// Commands that need introspection (`rename_column`, and `drop_column`
    /// on SQLite) fail with [`crate::SchemaError::IntrospectionUnavailable`].
    ///
    /// Table names are prefixed with `grammar.table_prefix()`, never with
    /// `connection.table_prefix`. Pass `connection.grammar()` to get a
    /// grammar carrying the connection's prefix.
    pub fn to_sql(self, connection: &ConnectionInfo, grammar: &dyn Grammar) -> Result<Vec<String>> {
        self.compile(grammar, &CompileContext::new(connection))
    }

    /// Finalizes the blueprint and compiles every command in order.
    ///
    /// Commands the grammar has no compiler for are skipped.
    pub fn compile(mut self, grammar: &dyn Grammar, ctx: &CompileContext<'_>) -> Result<Vec<String>> {
        self.validate()?;
        self.add_implied_commands();

        if ctx.connection.table_prefix != grammar.table_prefix() {
            warn!(
                connection_prefix = %ctx.connection.table_prefix,
                grammar_prefix = %grammar.table_prefix(),
                "Table prefix differs between connection and grammar, using the grammar's"
            );
        }

        debug!(
            table = %self.table,
            dialect = grammar.dialect().name(),
            commands = self.commands.len(),
            "Compiling blueprint"
        );

        let mut statements = Vec::new();
        for command in &self.commands {
            match grammar.compile(&self, command, ctx)? {
                Some(sql) => statements.extend(sql),
                None => trace!(command = command.name(), "No compiler for command, skipping"),
            }
        }
        Ok(statements)
    }

    /// Compiles the blueprint and executes each statement in order.
    ///
    /// Stops at the first failing statement and returns its error; the
    /// remaining statements are not executed.
    pub fn build(
        self,
        connection: &ConnectionInfo,
        grammar: &dyn Grammar,
        executor: &dyn Executor,
    ) -> Result<()> {
        let table = self.table.clone();
        let ctx = CompileContext {
            connection,
            introspector: executor.introspector(),
        };
        let statements = self.compile(grammar, &ctx)?;

        for sql in &statements {
            debug!(sql = %sql, "Executing SQL");
            if let Err(err) = executor.execute(sql) {
                warn!(table = %table, sql = %sql, error = %err, "Statement failed");
                return Err(err);
            }
        }
        Ok(())
    }
}
