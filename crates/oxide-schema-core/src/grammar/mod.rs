//! Dialect grammars.
//!
//! A [`Grammar`] turns the commands of a [`Blueprint`] into SQL text for one
//! database family. The trait carries the shared construction utilities as
//! default methods (quoting, column lists, the modifier loop); each dialect
//! supplies its constant tables, its type mapping, its modifier clauses and a
//! [`Grammar::compile`] that maps every supported command to statements.

mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

pub use mysql::MySqlGrammar;
pub use postgres::PostgresGrammar;
pub use sqlite::SqliteGrammar;
pub use sqlserver::SqlServerGrammar;

use crate::blueprint::{Blueprint, ColumnSpec, ColumnType, Command, ForeignKeyCommand};
use crate::connection::{ConnectionInfo, Dialect};
use crate::error::{Result, SchemaError};
use crate::introspect::{Introspector, TableDiff};

/// Column modifiers, applied in the order a grammar declares them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// `unsigned`
    Unsigned,
    /// `null` / `not null`
    Nullable,
    /// `default <value>`
    Default,
    /// Auto-increment and inline primary key.
    Increment,
    /// Column placement (`after <column>`).
    After,
}

/// State available to a grammar while compiling one blueprint.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    /// The connection the statements are compiled for.
    pub connection: &'a ConnectionInfo,
    /// Schema introspection, needed by column renames and SQLite column drops.
    pub introspector: Option<&'a dyn Introspector>,
}

impl<'a> CompileContext<'a> {
    /// Creates a context without introspection.
    #[must_use]
    pub const fn new(connection: &'a ConnectionInfo) -> Self {
        Self {
            connection,
            introspector: None,
        }
    }

    /// Attaches an introspector.
    #[must_use]
    pub fn with_introspector(mut self, introspector: &'a dyn Introspector) -> Self {
        self.introspector = Some(introspector);
        self
    }

    /// Returns the introspector, or an error naming the command that needed it.
    pub fn introspector(&self, command: &'static str) -> Result<&'a dyn Introspector> {
        self.introspector
            .ok_or(SchemaError::IntrospectionUnavailable(command))
    }
}

/// Trait for dialect-specific DDL generation.
pub trait Grammar {
    /// Returns the dialect this grammar compiles for.
    fn dialect(&self) -> Dialect;

    /// Returns the identifier quote character.
    fn wrapper(&self) -> char;

    /// Returns the modifiers in the order they are appended to a column.
    fn modifiers(&self) -> &'static [Modifier];

    /// Returns the column types that support native auto-increment.
    fn serials(&self) -> &'static [ColumnType];

    /// Returns the table prefix.
    fn table_prefix(&self) -> &str;

    /// Sets the table prefix.
    fn set_table_prefix(&mut self, prefix: String);

    /// Returns the native type of a column.
    fn type_sql(&self, column: &ColumnSpec) -> String;

    /// Returns the clause a modifier contributes to a column, if any.
    fn modify(&self, modifier: Modifier, column: &ColumnSpec) -> Option<String>;

    /// Compiles one command.
    ///
    /// Returns `Ok(None)` when the grammar has no compiler for the command;
    /// the blueprint then skips it. `Ok(Some(vec![]))` means the command is
    /// supported but emits nothing on its own.
    fn compile(
        &self,
        blueprint: &Blueprint,
        command: &Command,
        ctx: &CompileContext<'_>,
    ) -> Result<Option<Vec<String>>>;

    /// Returns a query whose result is non-empty when the table exists, and
    /// its positional bindings. The table prefix is applied.
    fn compile_table_exists(&self, table: &str, database: Option<&str>) -> (String, Vec<String>);

    /// Returns a query listing the columns of a table, and its positional
    /// bindings. The first result column is the column name. The table
    /// prefix is applied.
    fn compile_column_listing(&self, table: &str, database: Option<&str>)
        -> (String, Vec<String>);

    /// Returns the `strftime` format of stored dates.
    fn date_format(&self) -> &'static str {
        "%Y-%m-%d %H:%M:%S"
    }

    /// Quotes a single identifier. `*` is never quoted.
    fn wrap_value(&self, value: &str) -> String {
        if value == "*" {
            return value.to_string();
        }
        let quote = self.wrapper();
        format!("{quote}{value}{quote}")
    }

    /// Quotes a possibly dotted or aliased reference.
    ///
    /// `a.b` quotes `a` as a prefixed table and `b` as a value; `x as y`
    /// quotes both sides independently.
    fn wrap(&self, value: &str) -> String {
        if let Some(pos) = value.to_ascii_lowercase().find(" as ") {
            return format!(
                "{} as {}",
                self.wrap(&value[..pos]),
                self.wrap(&value[pos + 4..])
            );
        }

        let segments: Vec<&str> = value.split('.').collect();
        if segments.len() == 1 {
            return self.wrap_value(value);
        }
        segments
            .iter()
            .enumerate()
            .map(|(i, segment)| {
                if i == 0 {
                    self.wrap_value(&format!("{}{segment}", self.table_prefix()))
                } else {
                    self.wrap_value(segment)
                }
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Prefixes and quotes a table name.
    fn wrap_table(&self, table: &str) -> String {
        self.wrap(&format!("{}{table}", self.table_prefix()))
    }

    /// Quotes every value.
    fn wrap_array(&self, values: &[String]) -> Vec<String> {
        values.iter().map(|v| self.wrap(v)).collect()
    }

    /// Quotes and comma-joins column names.
    fn columnize(&self, columns: &[String]) -> String {
        self.wrap_array(columns).join(", ")
    }

    /// Returns `true` if the column auto-increments natively in this dialect.
    fn is_serial(&self, column: &ColumnSpec) -> bool {
        column.auto_increment && self.serials().contains(&column.column_type)
    }

    /// Concatenates the clauses of every modifier, in declared order.
    fn modifiers_sql(&self, column: &ColumnSpec) -> String {
        self.modifiers()
            .iter()
            .filter_map(|&m| self.modify(m, column))
            .collect()
    }

    /// Returns the full definition of a column: name, type and modifiers.
    fn column_definition(&self, column: &ColumnSpec) -> String {
        format!(
            "{} {}{}",
            self.wrap(&column.name),
            self.type_sql(column),
            self.modifiers_sql(column)
        )
    }

    /// Returns the definitions of every column of a blueprint.
    fn column_definitions(&self, blueprint: &Blueprint) -> Vec<String> {
        blueprint
            .columns()
            .iter()
            .map(|c| self.column_definition(c))
            .collect()
    }

    /// Compiles `alter table ... add constraint ... foreign key ...`.
    fn compile_foreign(&self, blueprint: &Blueprint, command: &ForeignKeyCommand) -> String {
        let mut sql = format!(
            "alter table {} add constraint {} foreign key ({}) references {} ({})",
            self.wrap_table(blueprint.table()),
            self.wrap_value(&command.index),
            self.columnize(&command.columns),
            self.wrap_table(&command.on),
            self.columnize(&command.references),
        );
        if let Some(action) = &command.on_delete {
            sql.push_str(" on delete ");
            sql.push_str(action);
        }
        if let Some(action) = &command.on_update {
            sql.push_str(" on update ");
            sql.push_str(action);
        }
        sql
    }

    /// Reads the current columns of the blueprint's table into an empty diff.
    fn table_diff(&self, blueprint: &Blueprint, introspector: &dyn Introspector) -> Result<TableDiff> {
        let table = format!("{}{}", self.table_prefix(), blueprint.table());
        let columns = introspector.describe_table(&table)?;
        Ok(TableDiff::new(table, columns))
    }

    /// Compiles a column rename through the introspector's platform adapter.
    fn compile_rename_column(
        &self,
        blueprint: &Blueprint,
        from: &str,
        to: &str,
        ctx: &CompileContext<'_>,
    ) -> Result<Vec<String>> {
        let introspector = ctx.introspector("rename_column")?;
        let mut diff = self.table_diff(blueprint, introspector)?;
        let column = introspector.column(&diff.table, from)?;
        diff.renamed_columns
            .push((from.to_string(), column.renamed(to)));
        introspector.alter_table_sql(&diff)
    }
}

/// Prepends a keyword to every value (`add`, `drop column`, ...).
#[must_use]
pub fn prefix_array(prefix: &str, values: &[String]) -> Vec<String> {
    values.iter().map(|v| format!("{prefix} {v}")).collect()
}

/// Single-quotes a string literal, doubling embedded quotes.
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// The `null` / `not null` clause. Native auto-increment columns get none.
pub(crate) fn nullable_clause(column: &ColumnSpec, serial: bool) -> Option<String> {
    if serial {
        return None;
    }
    Some(if column.nullable { " null" } else { " not null" }.to_string())
}

pub(crate) fn default_clause(column: &ColumnSpec) -> Option<String> {
    column
        .default
        .as_ref()
        .map(|value| format!(" default {}", value.to_sql()))
}
