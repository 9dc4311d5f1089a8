//! PostgreSQL grammar.

use crate::blueprint::{Blueprint, ColumnSpec, ColumnType, Command, IndexCommand};
use crate::connection::Dialect;
use crate::error::Result;

use super::{
    default_clause, nullable_clause, prefix_array, quote_string, CompileContext, Grammar, Modifier,
};

const MODIFIERS: &[Modifier] = &[Modifier::Increment, Modifier::Nullable, Modifier::Default];

const SERIALS: &[ColumnType] = &[ColumnType::BigInteger, ColumnType::Integer];

/// PostgreSQL grammar.
#[derive(Debug, Clone, Default)]
pub struct PostgresGrammar {
    table_prefix: String,
}

impl PostgresGrammar {
    /// Creates a new PostgreSQL grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn compile_index(&self, blueprint: &Blueprint, command: &IndexCommand, unique: bool) -> String {
        format!(
            "create {}index {} on {} ({})",
            if unique { "unique " } else { "" },
            self.wrap_value(&command.index),
            self.wrap_table(blueprint.table()),
            self.columnize(&command.columns)
        )
    }
}

impl Grammar for PostgresGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn wrapper(&self) -> char {
        '"'
    }

    fn modifiers(&self) -> &'static [Modifier] {
        MODIFIERS
    }

    fn serials(&self) -> &'static [ColumnType] {
        SERIALS
    }

    fn table_prefix(&self) -> &str {
        &self.table_prefix
    }

    fn set_table_prefix(&mut self, prefix: String) {
        self.table_prefix = prefix;
    }

    fn type_sql(&self, column: &ColumnSpec) -> String {
        match column.column_type {
            ColumnType::Char => format!("char({})", column.length.unwrap_or(255)),
            ColumnType::String => format!("varchar({})", column.length.unwrap_or(255)),
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText => "text".into(),
            ColumnType::Json => "json".into(),
            ColumnType::Integer if column.auto_increment => "serial".into(),
            ColumnType::Integer | ColumnType::MediumInteger => "integer".into(),
            ColumnType::BigInteger if column.auto_increment => "bigserial".into(),
            ColumnType::BigInteger => "bigint".into(),
            ColumnType::SmallInteger | ColumnType::TinyInteger => "smallint".into(),
            ColumnType::Float => "real".into(),
            ColumnType::Double => "double precision".into(),
            ColumnType::Decimal => format!(
                "decimal({}, {})",
                column.total.unwrap_or(8),
                column.places.unwrap_or(2)
            ),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Enum => {
                let allowed: Vec<String> =
                    column.allowed.iter().map(|a| quote_string(a)).collect();
                format!(
                    "varchar(255) check ({} in ({}))",
                    self.wrap(&column.name),
                    allowed.join(", ")
                )
            }
            ColumnType::Date => "date".into(),
            ColumnType::DateTime | ColumnType::Timestamp => "timestamp".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Binary => "bytea".into(),
        }
    }

    fn modify(&self, modifier: Modifier, column: &ColumnSpec) -> Option<String> {
        match modifier {
            Modifier::Increment => self
                .is_serial(column)
                .then(|| " primary key".to_string()),
            Modifier::Nullable => nullable_clause(column, self.is_serial(column)),
            Modifier::Default => default_clause(column),
            Modifier::Unsigned | Modifier::After => None,
        }
    }

    fn compile(
        &self,
        blueprint: &Blueprint,
        command: &Command,
        ctx: &CompileContext<'_>,
    ) -> Result<Option<Vec<String>>> {
        let table = self.wrap_table(blueprint.table());
        let sql = match command {
            Command::Create => format!(
                "create table {table} ({})",
                self.column_definitions(blueprint).join(", ")
            ),
            Command::Add => format!(
                "alter table {table} {}",
                prefix_array("add column", &self.column_definitions(blueprint)).join(", ")
            ),
            Command::Primary(c) => format!(
                "alter table {table} add primary key ({})",
                self.columnize(&c.columns)
            ),
            Command::Unique(c) => self.compile_index(blueprint, c, true),
            Command::Index(c) => self.compile_index(blueprint, c, false),
            Command::Foreign(c) => self.compile_foreign(blueprint, c),
            Command::Drop => format!("drop table {table}"),
            Command::DropIfExists => format!("drop table if exists {table}"),
            Command::DropColumn { columns } => format!(
                "alter table {table} {}",
                prefix_array("drop column", &self.wrap_array(columns)).join(", ")
            ),
            Command::RenameColumn { from, to } => {
                return self
                    .compile_rename_column(blueprint, from, to, ctx)
                    .map(Some);
            }
            Command::ModifyColumn { column } => format!(
                "alter table {table} alter column {} type {}{}",
                self.wrap(&column.name),
                self.type_sql(column),
                self.modifiers_sql(column)
            ),
            Command::DropPrimary(_) => format!(
                "alter table {table} drop constraint {}",
                self.wrap_value(&format!("{}{}_pkey", self.table_prefix, blueprint.table()))
            ),
            Command::DropUnique(c) | Command::DropIndex(c) => {
                format!("drop index {}", self.wrap_value(&c.index))
            }
            Command::DropForeign(c) => format!(
                "alter table {table} drop constraint {}",
                self.wrap_value(&c.index)
            ),
            Command::Rename { to } => {
                format!("alter table {table} rename to {}", self.wrap_table(to))
            }
            Command::ModifyNullable { .. } | Command::ModifyDefault { .. } => return Ok(None),
        };
        Ok(Some(vec![sql]))
    }

    fn compile_table_exists(&self, table: &str, _database: Option<&str>) -> (String, Vec<String>) {
        (
            "select * from information_schema.tables where table_name = ?".to_string(),
            vec![format!("{}{table}", self.table_prefix)],
        )
    }

    fn compile_column_listing(&self, table: &str, _database: Option<&str>) -> (String, Vec<String>) {
        (
            "select column_name from information_schema.columns where table_name = ?".to_string(),
            vec![format!("{}{table}", self.table_prefix)],
        )
    }
}
