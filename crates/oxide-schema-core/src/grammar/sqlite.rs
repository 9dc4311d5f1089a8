//! SQLite grammar.
//!
//! SQLite cannot add primary or foreign keys to an existing table, so both
//! are declared inline by `create` and their standalone commands compile to
//! nothing. Dropping a column goes through the introspector.

use crate::blueprint::{Blueprint, ColumnSpec, ColumnType, Command, ForeignKeyCommand};
use crate::connection::Dialect;
use crate::error::Result;

use super::{default_clause, nullable_clause, prefix_array, CompileContext, Grammar, Modifier};

const MODIFIERS: &[Modifier] = &[Modifier::Nullable, Modifier::Default, Modifier::Increment];

const SERIALS: &[ColumnType] = &[ColumnType::BigInteger, ColumnType::Integer];

/// SQLite grammar.
#[derive(Debug, Clone, Default)]
pub struct SqliteGrammar {
    table_prefix: String,
}

impl SqliteGrammar {
    /// Creates a new SQLite grammar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn compile_create(&self, blueprint: &Blueprint) -> String {
        let mut sql = format!(
            "create table {} ({}",
            self.wrap_table(blueprint.table()),
            self.column_definitions(blueprint).join(", ")
        );

        for command in blueprint.commands() {
            if let Command::Foreign(foreign) = command {
                sql.push_str(&self.inline_foreign_key(foreign));
            }
        }

        let primary = blueprint.commands().iter().find_map(|c| match c {
            Command::Primary(primary) => Some(primary),
            _ => None,
        });
        if let Some(primary) = primary {
            sql.push_str(&format!(", primary key ({})", self.columnize(&primary.columns)));
        }

        sql.push(')');
        sql
    }

    fn inline_foreign_key(&self, foreign: &ForeignKeyCommand) -> String {
        let mut sql = format!(
            ", foreign key ({}) references {} ({})",
            self.columnize(&foreign.columns),
            self.wrap_table(&foreign.on),
            self.columnize(&foreign.references)
        );
        if let Some(action) = &foreign.on_delete {
            sql.push_str(" on delete ");
            sql.push_str(action);
        }
        if let Some(action) = &foreign.on_update {
            sql.push_str(" on update ");
            sql.push_str(action);
        }
        sql
    }

    fn compile_drop_column(
        &self,
        blueprint: &Blueprint,
        columns: &[String],
        ctx: &CompileContext<'_>,
    ) -> Result<Vec<String>> {
        let introspector = ctx.introspector("drop_column")?;
        let mut diff = self.table_diff(blueprint, introspector)?;
        for name in columns {
            let column = introspector.column(&diff.table, name)?;
            diff.removed_columns.push((name.clone(), column));
        }
        introspector.alter_table_sql(&diff)
    }
}

impl Grammar for SqliteGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
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
        let name = match column.column_type {
            ColumnType::Char | ColumnType::String | ColumnType::Enum => "varchar",
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText | ColumnType::Json => {
                "text"
            }
            ColumnType::Integer
            | ColumnType::BigInteger
            | ColumnType::MediumInteger
            | ColumnType::SmallInteger
            | ColumnType::TinyInteger => "integer",
            ColumnType::Float | ColumnType::Double | ColumnType::Decimal => "float",
            ColumnType::Boolean => "tinyint",
            ColumnType::Date => "date",
            ColumnType::DateTime | ColumnType::Timestamp => "datetime",
            ColumnType::Time => "time",
            ColumnType::Binary => "blob",
        };
        name.to_string()
    }

    fn modify(&self, modifier: Modifier, column: &ColumnSpec) -> Option<String> {
        match modifier {
            Modifier::Nullable => nullable_clause(column, self.is_serial(column)),
            Modifier::Default => default_clause(column),
            Modifier::Increment => self
                .is_serial(column)
                .then(|| " primary key autoincrement".to_string()),
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
            Command::Create => self.compile_create(blueprint),
            Command::Add => {
                return Ok(Some(
                    prefix_array("add column", &self.column_definitions(blueprint))
                        .into_iter()
                        .map(|column| format!("alter table {table} {column}"))
                        .collect(),
                ));
            }
            Command::Primary(_) | Command::Foreign(_) => return Ok(Some(Vec::new())),
            Command::Unique(c) | Command::Index(c) => format!(
                "create {}index {} on {table} ({})",
                if matches!(command, Command::Unique(_)) { "unique " } else { "" },
                self.wrap_value(&c.index),
                self.columnize(&c.columns)
            ),
            Command::Drop => format!("drop table {table}"),
            Command::DropIfExists => format!("drop table if exists {table}"),
            Command::DropColumn { columns } => {
                return self.compile_drop_column(blueprint, columns, ctx).map(Some);
            }
            Command::RenameColumn { from, to } => {
                return self
                    .compile_rename_column(blueprint, from, to, ctx)
                    .map(Some);
            }
            Command::DropUnique(c) | Command::DropIndex(c) => {
                format!("drop index {}", self.wrap_value(&c.index))
            }
            Command::Rename { to } => {
                format!("alter table {table} rename to {}", self.wrap_table(to))
            }
            Command::ModifyColumn { .. }
            | Command::ModifyNullable { .. }
            | Command::ModifyDefault { .. }
            | Command::DropPrimary(_)
            | Command::DropForeign(_) => return Ok(None),
        };
        Ok(Some(vec![sql]))
    }

    fn compile_table_exists(&self, table: &str, _database: Option<&str>) -> (String, Vec<String>) {
        (
            "select * from sqlite_master where type = 'table' and name = ?".to_string(),
            vec![format!("{}{table}", self.table_prefix)],
        )
    }

    fn compile_column_listing(&self, table: &str, _database: Option<&str>) -> (String, Vec<String>) {
        let table = format!("{}{table}", self.table_prefix)
            .replace('.', "__")
            .replace('\'', "''");
        (format!("select name from pragma_table_info('{table}')"), Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionInfo;
    use crate::error::SchemaError;
    use crate::introspect::{ColumnMetadata, Introspector, TableDiff};

    fn compile(blueprint: Blueprint) -> Vec<String> {
        let info = ConnectionInfo::new(Dialect::Sqlite);
        blueprint.to_sql(&info, &SqliteGrammar::new()).unwrap()
    }

    struct Recording;

    impl Introspector for Recording {
        fn describe_table(&self, _table: &str) -> Result<Vec<ColumnMetadata>> {
            Ok(vec![
                ColumnMetadata::new("id", "integer"),
                ColumnMetadata::new("a", "varchar"),
                ColumnMetadata::new("b", "text"),
            ])
        }

        fn alter_table_sql(&self, diff: &TableDiff) -> Result<Vec<String>> {
            let removed: Vec<&str> = diff.removed_columns.iter().map(|(n, _)| n.as_str()).collect();
            Ok(vec![format!("-- {} drop {}", diff.table, removed.join(","))])
        }
    }

    #[test]
    fn test_create_with_autoincrement() {
        let mut table = Blueprint::new("users");
        table.create();
        table.increments("id");
        table.string("name", 255);

        assert_eq!(
            compile(table),
            vec!["create table \"users\" (\"id\" integer primary key autoincrement, \"name\" varchar not null)"]
        );
    }

    #[test]
    fn test_create_with_inline_keys() {
        let mut table = Blueprint::new("memberships");
        table.create();
        table.integer("user_id");
        table.integer("team_id");
        table.primary(["user_id", "team_id"]);
        table.foreign("user_id").references("id").on("users").on_delete("cascade");
        table.foreign("team_id").references("id").on("teams");

        assert_eq!(
            compile(table),
            vec![
                "create table \"memberships\" (\"user_id\" integer not null, \"team_id\" integer not null, \
                 foreign key (\"user_id\") references \"users\" (\"id\") on delete cascade, \
                 foreign key (\"team_id\") references \"teams\" (\"id\"), \
                 primary key (\"user_id\", \"team_id\"))"
            ]
        );
    }

    #[test]
    fn test_foreign_emits_nothing() {
        let mut table = Blueprint::new("posts");
        table.foreign("user_id").references("id").on("users");
        assert!(compile(table).is_empty());
    }

    #[test]
    fn test_add_one_statement_per_column() {
        let mut table = Blueprint::new("users");
        table.string("a", 10).nullable();
        table.integer("b").default(3);

        assert_eq!(
            compile(table),
            vec![
                "alter table \"users\" add column \"a\" varchar null",
                "alter table \"users\" add column \"b\" integer not null default '3'",
            ]
        );
    }

    #[test]
    fn test_indexes_and_drops() {
        let mut table = Blueprint::new("users");
        table.unique("email");
        table.index("name");
        table.drop_unique(["email"]);
        table.drop_index("name_idx");
        table.drop_primary("users_pkey");
        table.drop_foreign("fk");

        assert_eq!(
            compile(table),
            vec![
                "create unique index \"users_email_unique\" on \"users\" (\"email\")",
                "create index \"users_name_index\" on \"users\" (\"name\")",
                "drop index \"users_email_unique\"",
                "drop index \"name_idx\"",
            ]
        );
    }

    #[test]
    fn test_rename_and_drop_table() {
        let mut table = Blueprint::new("users");
        table.rename("members");
        table.drop_if_exists();

        assert_eq!(
            compile(table),
            vec![
                "alter table \"users\" rename to \"members\"",
                "drop table if exists \"users\"",
            ]
        );
    }

    #[test]
    fn test_drop_column_requires_introspector() {
        let info = ConnectionInfo::new(Dialect::Sqlite);
        let mut table = Blueprint::new("users");
        table.drop_column("a");

        let err = table.to_sql(&info, &SqliteGrammar::new()).unwrap_err();
        assert!(matches!(err, SchemaError::IntrospectionUnavailable("drop_column")));
    }

    #[test]
    fn test_drop_column_builds_diff() {
        let info = ConnectionInfo::new(Dialect::Sqlite).table_prefix("app_");
        let ctx = CompileContext::new(&info).with_introspector(&Recording);
        let mut table = Blueprint::new("users");
        table.drop_column(["a", "b"]);

        let sql = table.compile(info.grammar().as_ref(), &ctx).unwrap();
        assert_eq!(sql, vec!["-- app_users drop a,b"]);
    }

    #[test]
    fn test_drop_column_missing() {
        let info = ConnectionInfo::new(Dialect::Sqlite);
        let ctx = CompileContext::new(&info).with_introspector(&Recording);
        let mut table = Blueprint::new("users");
        table.drop_column("missing");

        let err = table.compile(&SqliteGrammar::new(), &ctx).unwrap_err();
        assert!(matches!(err, SchemaError::ColumnNotFound { .. }));
    }

    #[test]
    fn test_column_listing_pragma() {
        let mut grammar = SqliteGrammar::new();
        grammar.set_table_prefix("app.".into());
        let (sql, bindings) = grammar.compile_column_listing("users", None);
        assert_eq!(sql, "select name from pragma_table_info('app__users')");
        assert!(bindings.is_empty());
    }
}
