//! SQL Server grammar.

use crate::blueprint::{Blueprint, ColumnSpec, ColumnType, Command, IndexCommand};
use crate::connection::Dialect;
use crate::error::Result;

use super::{default_clause, nullable_clause, CompileContext, Grammar, Modifier};

const MODIFIERS: &[Modifier] = &[Modifier::Increment, Modifier::Nullable, Modifier::Default];

const SERIALS: &[ColumnType] = &[ColumnType::BigInteger, ColumnType::Integer];

/// SQL Server grammar.
#[derive(Debug, Clone, Default)]
pub struct SqlServerGrammar {
    table_prefix: String,
}

impl SqlServerGrammar {
    /// Creates a new SQL Server grammar.
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

impl Grammar for SqlServerGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
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
            ColumnType::Char => format!("nchar({})", column.length.unwrap_or(255)),
            ColumnType::String => format!("nvarchar({})", column.length.unwrap_or(255)),
            ColumnType::Text | ColumnType::MediumText | ColumnType::LongText | ColumnType::Json => {
                "nvarchar(max)".into()
            }
            ColumnType::Integer | ColumnType::MediumInteger => "int".into(),
            ColumnType::BigInteger => "bigint".into(),
            ColumnType::SmallInteger => "smallint".into(),
            ColumnType::TinyInteger => "tinyint".into(),
            ColumnType::Float | ColumnType::Double => "float".into(),
            ColumnType::Decimal => format!(
                "decimal({}, {})",
                column.total.unwrap_or(8),
                column.places.unwrap_or(2)
            ),
            ColumnType::Boolean => "bit".into(),
            ColumnType::Enum => "nvarchar(255)".into(),
            ColumnType::Date => "date".into(),
            ColumnType::DateTime | ColumnType::Timestamp => "datetime".into(),
            ColumnType::Time => "time".into(),
            ColumnType::Binary => "varbinary(max)".into(),
        }
    }

    fn modify(&self, modifier: Modifier, column: &ColumnSpec) -> Option<String> {
        match modifier {
            Modifier::Increment => self
                .is_serial(column)
                .then(|| " identity primary key".to_string()),
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
                "alter table {table} add {}",
                self.column_definitions(blueprint).join(", ")
            ),
            Command::Primary(c) => format!(
                "alter table {table} add constraint {} primary key ({})",
                self.wrap_value(&c.index),
                self.columnize(&c.columns)
            ),
            Command::Unique(c) => self.compile_index(blueprint, c, true),
            Command::Index(c) => self.compile_index(blueprint, c, false),
            Command::Foreign(c) => self.compile_foreign(blueprint, c),
            Command::Drop => format!("drop table {table}"),
            Command::DropColumn { columns } => format!(
                "alter table {table} drop column {}",
                self.wrap_array(columns).join(", ")
            ),
            Command::RenameColumn { from, to } => {
                return self
                    .compile_rename_column(blueprint, from, to, ctx)
                    .map(Some);
            }
            Command::ModifyColumn { column } => format!(
                "alter table {table} alter column {}",
                self.column_definition(column)
            ),
            Command::DropPrimary(c) | Command::DropForeign(c) => format!(
                "alter table {table} drop constraint {}",
                self.wrap_value(&c.index)
            ),
            Command::DropUnique(c) | Command::DropIndex(c) => {
                format!("drop index {} on {table}", self.wrap_value(&c.index))
            }
            Command::Rename { to } => format!("sp_rename {table}, {}", self.wrap_table(to)),
            Command::DropIfExists
            | Command::ModifyNullable { .. }
            | Command::ModifyDefault { .. } => return Ok(None),
        };
        Ok(Some(vec![sql]))
    }

    fn compile_table_exists(&self, table: &str, _database: Option<&str>) -> (String, Vec<String>) {
        (
            "select * from sysobjects where type = 'U' and name = ?".to_string(),
            vec![format!("{}{table}", self.table_prefix)],
        )
    }

    fn compile_column_listing(&self, table: &str, _database: Option<&str>) -> (String, Vec<String>) {
        (
            "select col.name from sys.columns as col \
             join sys.objects as obj on col.object_id = obj.object_id \
             where obj.type = 'U' and obj.name = ?"
                .to_string(),
            vec![format!("{}{table}", self.table_prefix)],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionInfo;

    fn compile(blueprint: Blueprint) -> Vec<String> {
        let info = ConnectionInfo::new(Dialect::SqlServer);
        blueprint.to_sql(&info, &SqlServerGrammar::new()).unwrap()
    }

    #[test]
    fn test_create_with_identity() {
        let mut table = Blueprint::new("users");
        table.create();
        table.increments("id");
        table.string("name", 255);

        assert_eq!(
            compile(table),
            vec!["create table \"users\" (\"id\" int identity primary key, \"name\" nvarchar(255) not null)"]
        );
    }

    #[test]
    fn test_add_columns() {
        let mut table = Blueprint::new("users");
        table.text("bio").nullable();
        table.boolean("active").default(false);

        assert_eq!(
            compile(table),
            vec!["alter table \"users\" add \"bio\" nvarchar(max) null, \"active\" bit not null default '0'"]
        );
    }

    #[test]
    fn test_indexes() {
        let mut table = Blueprint::new("users");
        table.primary("id");
        table.unique("email");
        table.index("name");

        assert_eq!(
            compile(table),
            vec![
                "alter table \"users\" add constraint \"users_id_primary\" primary key (\"id\")",
                "create unique index \"users_email_unique\" on \"users\" (\"email\")",
                "create index \"users_name_index\" on \"users\" (\"name\")",
            ]
        );
    }

    #[test]
    fn test_foreign() {
        let mut table = Blueprint::new("posts");
        table.foreign("user_id").references("id").on("users").on_delete("cascade");

        let sql = compile(table);
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains("references \"users\" (\"id\")"));
        assert!(sql[0].ends_with(" on delete cascade"));
    }

    #[test]
    fn test_drop_commands() {
        let mut table = Blueprint::new("users");
        table.drop_column(["a", "b"]);
        table.drop_primary(["id"]);
        table.drop_unique(["email"]);
        table.drop_index("name_idx");
        table.drop_foreign("fk_users_team");
        table.drop_if_exists();
        table.drop();

        assert_eq!(
            compile(table),
            vec![
                "alter table \"users\" drop column \"a\", \"b\"",
                "alter table \"users\" drop constraint \"users_id_primary\"",
                "drop index \"users_email_unique\" on \"users\"",
                "drop index \"name_idx\" on \"users\"",
                "alter table \"users\" drop constraint \"fk_users_team\"",
                "drop table \"users\"",
            ]
        );
    }

    #[test]
    fn test_modify_and_rename() {
        let mut table = Blueprint::new("users");
        table.modify_column("name", ColumnType::String).nullable();
        table.rename("members");

        assert_eq!(
            compile(table),
            vec![
                "alter table \"users\" alter column \"name\" nvarchar(255) null",
                "sp_rename \"users\", \"members\"",
            ]
        );
    }

    #[test]
    fn test_types() {
        let grammar = SqlServerGrammar::new();
        let cases = [
            (ColumnSpec::new("a", ColumnType::Json), "nvarchar(max)"),
            (ColumnSpec::new("a", ColumnType::Double), "float"),
            (ColumnSpec::new("a", ColumnType::Enum), "nvarchar(255)"),
            (ColumnSpec::new("a", ColumnType::Timestamp), "datetime"),
            (ColumnSpec::new("a", ColumnType::Binary), "varbinary(max)"),
        ];
        for (column, expected) in cases {
            assert_eq!(grammar.type_sql(&column), expected);
        }
    }

    #[test]
    fn test_existence_queries() {
        let grammar = SqlServerGrammar::new();
        let (sql, bindings) = grammar.compile_table_exists("users", None);
        assert_eq!(sql, "select * from sysobjects where type = 'U' and name = ?");
        assert_eq!(bindings, vec!["users"]);

        let (sql, _) = grammar.compile_column_listing("users", None);
        assert!(sql.starts_with("select col.name from sys.columns as col join sys.objects"));
    }
}
