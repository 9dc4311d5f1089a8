//! MySQL grammar.

use crate::blueprint::{
    Blueprint, ColumnSpec, ColumnType, Command, DefaultChange, IndexCommand,
};
use crate::connection::{ConnectionInfo, Dialect};
use crate::error::Result;

use super::{
    default_clause, nullable_clause, prefix_array, quote_string, CompileContext, Grammar, Modifier,
};

const MODIFIERS: &[Modifier] = &[
    Modifier::Unsigned,
    Modifier::Nullable,
    Modifier::Default,
    Modifier::Increment,
    Modifier::After,
];

const SERIALS: &[ColumnType] = &[
    ColumnType::BigInteger,
    ColumnType::Integer,
    ColumnType::MediumInteger,
    ColumnType::SmallInteger,
    ColumnType::TinyInteger,
];

/// MySQL grammar.
#[derive(Debug, Clone, Default)]
pub struct MySqlGrammar {
    table_prefix: String,
}

impl MySqlGrammar {
    /// Creates a new MySQL grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn compile_create(&self, blueprint: &Blueprint, connection: &ConnectionInfo) -> String {
        let mut sql = format!(
            "create table {} ({})",
            self.wrap_table(blueprint.table()),
            self.column_definitions(blueprint).join(", ")
        );
        if let Some(charset) = &connection.charset {
            sql.push_str(" default character set ");
            sql.push_str(charset);
        }
        if let Some(collation) = &connection.collation {
            sql.push_str(" collate ");
            sql.push_str(collation);
        }
        if let Some(engine) = blueprint.engine() {
            sql.push_str(" engine = ");
            sql.push_str(engine);
        }
        sql
    }

    fn compile_add(&self, blueprint: &Blueprint) -> String {
        let columns = prefix_array("add", &self.column_definitions(blueprint));
        format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            columns.join(", ")
        )
    }

    fn compile_key(&self, blueprint: &Blueprint, command: &IndexCommand, kind: &str) -> String {
        format!(
            "alter table {} add {kind} {}({})",
            self.wrap_table(blueprint.table()),
            self.wrap_value(&command.index),
            self.columnize(&command.columns)
        )
    }

    fn compile_drop_column(&self, blueprint: &Blueprint, columns: &[String]) -> String {
        let columns = prefix_array("drop", &self.wrap_array(columns));
        format!(
            "alter table {} {}",
            self.wrap_table(blueprint.table()),
            columns.join(", ")
        )
    }
}

impl Grammar for MySqlGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn wrapper(&self) -> char {
        '`'
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
            ColumnType::Text => "text".into(),
            ColumnType::MediumText => "mediumtext".into(),
            ColumnType::LongText => "longtext".into(),
            ColumnType::Json => "json".into(),
            ColumnType::Integer => "int".into(),
            ColumnType::BigInteger => "bigint".into(),
            ColumnType::MediumInteger => "mediumint".into(),
            ColumnType::SmallInteger => "smallint".into(),
            ColumnType::TinyInteger => "tinyint".into(),
            ColumnType::Float => format!(
                "float({}, {})",
                column.total.unwrap_or(8),
                column.places.unwrap_or(2)
            ),
            ColumnType::Double => match (column.total, column.places) {
                (Some(total), Some(places)) if total > 0 && places > 0 => {
                    format!("double({total}, {places})")
                }
                _ => "double".into(),
            },
            ColumnType::Decimal => format!(
                "decimal({}, {})",
                column.total.unwrap_or(8),
                column.places.unwrap_or(2)
            ),
            ColumnType::Boolean => "tinyint(1)".into(),
            ColumnType::Enum => {
                let allowed: Vec<String> = column.allowed.iter().map(|a| quote_string(a)).collect();
                format!("enum({})", allowed.join(", "))
            }
            ColumnType::Date => "date".into(),
            ColumnType::DateTime => "datetime".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Timestamp if column.nullable => "timestamp".into(),
            ColumnType::Timestamp => "timestamp default 0".into(),
            ColumnType::Binary => "blob".into(),
        }
    }

    fn modify(&self, modifier: Modifier, column: &ColumnSpec) -> Option<String> {
        match modifier {
            Modifier::Unsigned => column.unsigned.then(|| " unsigned".to_string()),
            Modifier::Nullable => nullable_clause(column, self.is_serial(column)),
            Modifier::Default => default_clause(column),
            Modifier::Increment => self
                .is_serial(column)
                .then(|| " auto_increment primary key".to_string()),
            Modifier::After => column
                .after
                .as_ref()
                .map(|after| format!(" after {}", self.wrap(after))),
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
            Command::Create => self.compile_create(blueprint, ctx.connection),
            Command::Add => self.compile_add(blueprint),
            Command::Primary(c) => format!(
                "alter table {table} add primary key ({})",
                self.columnize(&c.columns)
            ),
            Command::Unique(c) => self.compile_key(blueprint, c, "unique"),
            Command::Index(c) => self.compile_key(blueprint, c, "index"),
            Command::Foreign(c) => self.compile_foreign(blueprint, c),
            Command::Drop => format!("drop table {table}"),
            Command::DropIfExists => format!("drop table if exists {table}"),
            Command::DropColumn { columns } => self.compile_drop_column(blueprint, columns),
            Command::RenameColumn { from, to } => {
                return self
                    .compile_rename_column(blueprint, from, to, ctx)
                    .map(Some);
            }
            Command::ModifyColumn { column } => format!(
                "alter table {table} modify column {}",
                self.column_definition(column)
            ),
            Command::ModifyNullable { column, nullable } => format!(
                "alter table {table} modify column {}{}",
                self.wrap(column),
                if *nullable { " null" } else { " not null" }
            ),
            Command::ModifyDefault { column, change } => match change {
                DefaultChange::Drop => {
                    format!("alter table {table} alter column {} drop default", self.wrap(column))
                }
                DefaultChange::Set(value) => format!(
                    "alter table {table} alter column {} set default {}",
                    self.wrap(column),
                    value.to_sql()
                ),
            },
            Command::DropPrimary(_) => format!("alter table {table} drop primary key"),
            Command::DropUnique(c) | Command::DropIndex(c) => {
                format!("alter table {table} drop index {}", self.wrap_value(&c.index))
            }
            Command::DropForeign(c) => {
                format!("alter table {table} drop foreign key {}", self.wrap_value(&c.index))
            }
            Command::Rename { to } => format!("rename table {table} to {}", self.wrap_table(to)),
        };
        Ok(Some(vec![sql]))
    }

    fn compile_table_exists(&self, table: &str, database: Option<&str>) -> (String, Vec<String>) {
        (
            "select * from information_schema.tables where table_schema = ? and table_name = ?"
                .to_string(),
            vec![
                database.unwrap_or_default().to_string(),
                format!("{}{table}", self.table_prefix),
            ],
        )
    }

    fn compile_column_listing(&self, table: &str, database: Option<&str>) -> (String, Vec<String>) {
        (
            "select column_name from information_schema.columns where table_schema = ? and table_name = ?"
                .to_string(),
            vec![
                database.unwrap_or_default().to_string(),
                format!("{}{table}", self.table_prefix),
            ],
        )
    }
}
