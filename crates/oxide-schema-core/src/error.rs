//! Error types for schema compilation and execution.

/// Errors that can occur while resolving, compiling or running a blueprint.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The dialect identifier does not map to any grammar.
    #[error("Unsupported schema grammar: {0}")]
    UnsupportedDialect(String),

    /// The execution collaborator rejected a statement.
    #[error("Failed to execute '{statement}': {message}")]
    Execution {
        /// The statement that failed, verbatim.
        statement: String,
        /// Error reported by the database.
        message: String,
    },

    /// A command needs schema introspection but none is available.
    #[error("Command '{0}' requires schema introspection, but no introspector is available")]
    IntrospectionUnavailable(&'static str),

    /// The introspection collaborator reported an error.
    #[error("Introspection error: {0}")]
    Introspection(String),

    /// A column definition cannot be compiled.
    #[error("Invalid column '{column}' on table '{table}': {reason}")]
    InvalidColumn {
        /// Table the column belongs to.
        table: String,
        /// Column name as declared.
        column: String,
        /// What is wrong with the definition.
        reason: &'static str,
    },

    /// A column looked up through introspection does not exist.
    #[error("Column '{column}' not found on table '{table}'")]
    ColumnNotFound {
        /// Table that was described.
        table: String,
        /// Missing column.
        column: String,
    },
}

/// Result type for schema operations.
pub type Result<T> = std::result::Result<T, SchemaError>;
