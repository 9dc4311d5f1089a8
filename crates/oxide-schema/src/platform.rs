//! Per-dialect ALTER rendering for table diffs.
//!
//! The core grammars build a [`TableDiff`] for column renames (and SQLite
//! column drops); this module turns one into statements a database accepts.
//!
//! Only the column changes are rendered. Indexes on a removed column are
//! left to the caller; [`crate::SqliteExecutor`] drops them first.

use oxide_schema_core::{ColumnMetadata, Dialect, TableDiff};

/// Renders the statements that apply `diff` on `dialect`.
///
/// Renames come first, then removals, each in the order requested.
#[must_use]
pub fn alter_table_sql(dialect: Dialect, diff: &TableDiff) -> Vec<String> {
    if diff.is_empty() {
        return Vec::new();
    }

    let grammar = dialect.grammar();
    let table = grammar.wrap(&diff.table);

    let mut statements = Vec::with_capacity(diff.renamed_columns.len() + diff.removed_columns.len());

    for (from, column) in &diff.renamed_columns {
        let sql = match dialect {
            Dialect::MySql => format!(
                "alter table {table} change {} {} {}",
                grammar.wrap(from),
                grammar.wrap(&column.name),
                mysql_definition(column)
            ),
            Dialect::Postgres | Dialect::Sqlite => format!(
                "alter table {table} rename column {} to {}",
                grammar.wrap(from),
                grammar.wrap(&column.name)
            ),
            Dialect::SqlServer => format!(
                "sp_rename '{}.{}', '{}', 'COLUMN'",
                escape(&diff.table),
                escape(from),
                escape(&column.name)
            ),
        };
        statements.push(sql);
    }

    for (name, _) in &diff.removed_columns {
        statements.push(format!("alter table {table} drop column {}", grammar.wrap(name)));
    }

    statements
}

// MySQL `change` restates the full column definition.
fn mysql_definition(column: &ColumnMetadata) -> String {
    let mut sql = column.native_type.clone();
    if !column.nullable {
        sql.push_str(" not null");
    }
    if let Some(default) = &column.default {
        sql.push_str(" default ");
        sql.push_str(default);
    }
    sql
}

fn escape(value: &str) -> String {
    value.replace('\'', "''")
}
