//! Tests for executing blueprints and for introspection-backed commands.

mod common;

use common::{FakeIntrospector, RecordingExecutor, DIALECTS};
use oxide_schema_core::{Blueprint, CompileContext, ConnectionInfo, Dialect, SchemaError};

fn users_table() -> Blueprint {
    let mut table = Blueprint::new("users");
    table.create();
    table.increments("id");
    table.string("email", 255).unique();
    table
}

#[test]
fn test_build_executes_in_order() {
    let info = ConnectionInfo::new(Dialect::Sqlite);
    let executor = RecordingExecutor::default();

    users_table()
        .build(&info, info.grammar().as_ref(), &executor)
        .unwrap();

    assert_eq!(
        executor.executed(),
        vec![
            "create table \"users\" (\"id\" integer primary key autoincrement, \"email\" varchar not null)",
            "create unique index \"users_email_unique\" on \"users\" (\"email\")",
        ]
    );
}

#[test]
fn test_build_stops_at_first_failure() {
    let info = ConnectionInfo::new(Dialect::Sqlite);
    let executor = RecordingExecutor::failing_on("alter table \"users\" add column \"b\" integer not null");

    let mut table = Blueprint::new("users");
    table.integer("a");
    table.integer("b");
    table.integer("c");

    let err = table
        .build(&info, info.grammar().as_ref(), &executor)
        .unwrap_err();

    match err {
        SchemaError::Execution { statement, .. } => {
            assert_eq!(statement, "alter table \"users\" add column \"b\" integer not null");
        }
        other => panic!("Expected Execution, got {other:?}"),
    }
    assert_eq!(
        executor.executed(),
        vec!["alter table \"users\" add column \"a\" integer not null"]
    );
}

#[test]
fn test_rename_column_without_introspection_fails() {
    for dialect in DIALECTS {
        let info = ConnectionInfo::new(dialect);
        let mut table = Blueprint::new("users");
        table.rename_column("name", "full_name");

        let err = table.to_sql(&info, info.grammar().as_ref()).unwrap_err();
        assert!(
            matches!(err, SchemaError::IntrospectionUnavailable("rename_column")),
            "{dialect}: {err:?}"
        );
    }
}

#[test]
fn test_rename_column_builds_diff_for_every_dialect() {
    for dialect in DIALECTS {
        let info = ConnectionInfo::new(dialect).table_prefix("app_");
        let introspector = FakeIntrospector::new(&[("id", "integer"), ("name", "varchar(255)")]);
        let ctx = CompileContext::new(&info).with_introspector(&introspector);

        let mut table = Blueprint::new("users");
        table.rename_column("name", "full_name");
        let sql = table.compile(info.grammar().as_ref(), &ctx).unwrap();

        assert_eq!(sql, vec!["rename app_users.name to full_name varchar(255)"], "{dialect}");
        assert!(introspector
            .described
            .borrow()
            .iter()
            .all(|t| t == "app_users"));
    }
}

#[test]
fn test_rename_missing_column_fails() {
    let info = ConnectionInfo::new(Dialect::MySql);
    let introspector = FakeIntrospector::new(&[("id", "int")]);
    let ctx = CompileContext::new(&info).with_introspector(&introspector);

    let mut table = Blueprint::new("users");
    table.rename_column("missing", "other");
    let err = table.compile(info.grammar().as_ref(), &ctx).unwrap_err();

    assert!(matches!(
        err,
        SchemaError::ColumnNotFound { ref table, ref column } if table == "users" && column == "missing"
    ));
}

#[test]
fn test_build_uses_executor_introspector() {
    let info = ConnectionInfo::new(Dialect::Sqlite);
    let executor = RecordingExecutor::with_introspector(FakeIntrospector::new(&[
        ("id", "integer"),
        ("a", "text"),
        ("b", "text"),
    ]));

    let mut table = Blueprint::new("t");
    table.drop_column(["a", "b"]);
    table.build(&info, info.grammar().as_ref(), &executor).unwrap();

    assert_eq!(executor.executed(), vec!["remove t.a", "remove t.b"]);
}

#[test]
fn test_drop_column_other_dialects_need_no_introspection() {
    let info = ConnectionInfo::new(Dialect::Postgres);
    let executor = RecordingExecutor::default();

    let mut table = Blueprint::new("t");
    table.drop_column("a");
    table.build(&info, info.grammar().as_ref(), &executor).unwrap();

    assert_eq!(executor.executed(), vec!["alter table \"t\" drop column \"a\""]);
}
