#![allow(dead_code)]

use std::cell::RefCell;

use oxide_schema_core::{
    Blueprint, ColumnMetadata, ConnectionInfo, Dialect, Executor, Introspector, Result, Row,
    SchemaError, TableDiff,
};

pub const DIALECTS: [Dialect; 4] = [
    Dialect::MySql,
    Dialect::Postgres,
    Dialect::SqlServer,
    Dialect::Sqlite,
];

/// Compiles a blueprint built by `f` for a dialect, without introspection.
pub fn compile(dialect: Dialect, table: &str, f: impl FnOnce(&mut Blueprint)) -> Vec<String> {
    compile_with(&ConnectionInfo::new(dialect), table, f)
}

pub fn compile_with(
    info: &ConnectionInfo,
    table: &str,
    f: impl FnOnce(&mut Blueprint),
) -> Vec<String> {
    let mut blueprint = Blueprint::new(table);
    f(&mut blueprint);
    blueprint
        .to_sql(info, info.grammar().as_ref())
        .unwrap_or_else(|e| panic!("Failed to compile {table} for {}: {e}", info.dialect))
}

/// Introspector over a fixed column list that renders diffs as plain text.
pub struct FakeIntrospector {
    pub columns: Vec<ColumnMetadata>,
    pub described: RefCell<Vec<String>>,
}

impl FakeIntrospector {
    pub fn new(columns: &[(&str, &str)]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|(name, ty)| ColumnMetadata::new(*name, *ty))
                .collect(),
            described: RefCell::new(Vec::new()),
        }
    }
}

impl Introspector for FakeIntrospector {
    fn describe_table(&self, table: &str) -> Result<Vec<ColumnMetadata>> {
        self.described.borrow_mut().push(table.to_string());
        Ok(self.columns.clone())
    }

    fn alter_table_sql(&self, diff: &TableDiff) -> Result<Vec<String>> {
        let mut sql = Vec::new();
        for (from, column) in &diff.renamed_columns {
            sql.push(format!(
                "rename {}.{from} to {} {}",
                diff.table, column.name, column.native_type
            ));
        }
        for (name, _) in &diff.removed_columns {
            sql.push(format!("remove {}.{name}", diff.table));
        }
        Ok(sql)
    }
}

/// Executor that records statements and fails on a chosen one.
#[derive(Default)]
pub struct RecordingExecutor {
    pub executed: RefCell<Vec<String>>,
    pub fail_on: Option<String>,
    pub introspector: Option<FakeIntrospector>,
}

impl RecordingExecutor {
    pub fn failing_on(statement: &str) -> Self {
        Self {
            fail_on: Some(statement.to_string()),
            ..Self::default()
        }
    }

    pub fn with_introspector(introspector: FakeIntrospector) -> Self {
        Self {
            introspector: Some(introspector),
            ..Self::default()
        }
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }
}

impl Executor for RecordingExecutor {
    fn query(&self, sql: &str, _bindings: &[&str]) -> Result<Vec<Row>> {
        if self.fail_on.as_deref() == Some(sql) {
            return Err(SchemaError::Execution {
                statement: sql.to_string(),
                message: "simulated failure".to_string(),
            });
        }
        self.executed.borrow_mut().push(sql.to_string());
        Ok(Vec::new())
    }

    fn introspector(&self) -> Option<&dyn Introspector> {
        self.introspector.as_ref().map(|i| i as &dyn Introspector)
    }
}
