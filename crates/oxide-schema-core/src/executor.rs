//! The execution boundary.
//!
//! The compiler never talks to a database itself. Blueprints hand their
//! statements to an [`Executor`], which runs them in order and may expose an
//! [`Introspector`] for commands that need to read the live schema.

use crate::error::Result;
use crate::introspect::Introspector;

/// A result row. Each value is rendered as text; `None` is SQL NULL.
pub type Row = Vec<Option<String>>;

/// Runs SQL against a database.
pub trait Executor {
    /// Runs a query with positional `?` bindings and returns its rows.
    fn query(&self, sql: &str, bindings: &[&str]) -> Result<Vec<Row>>;

    /// Executes a statement, discarding any rows.
    fn execute(&self, sql: &str) -> Result<()> {
        self.query(sql, &[]).map(|_| ())
    }

    /// Returns the schema introspector, if this executor has one.
    fn introspector(&self) -> Option<&dyn Introspector> {
        None
    }
}
