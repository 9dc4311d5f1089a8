//! Error types for the schema runner.

use oxide_schema_core::SchemaError;

/// Errors that can occur while loading configuration or running schema operations.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Compilation or execution of a blueprint failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Database error outside of statement execution (connecting, pooling).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error (reading configuration, starting the runtime).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The requested connection profile does not exist.
    #[error("Connection profile not found: {0}")]
    ProfileNotFound(String),

    /// The configuration is structurally valid but unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
