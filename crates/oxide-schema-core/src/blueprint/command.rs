//! Structural commands accumulated by a blueprint.
//!
//! Commands are compiled in the order they were added. Each grammar maps
//! every command kind it supports to zero or more statements; kinds a
//! grammar does not support are skipped.

use super::column::{ColumnSpec, DefaultValue};

/// All structural commands a blueprint can carry.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Create the table.
    Create,
    /// Add every column of the blueprint to an existing table.
    Add,
    /// Drop the table.
    Drop,
    /// Drop the table if it exists.
    DropIfExists,
    /// Drop one or more columns.
    DropColumn {
        /// Columns to drop.
        columns: Vec<String>,
    },
    /// Rename a column.
    RenameColumn {
        /// Current column name.
        from: String,
        /// New column name.
        to: String,
    },
    /// Redefine an existing column.
    ModifyColumn {
        /// The new column definition.
        column: ColumnSpec,
    },
    /// Change the nullability of an existing column.
    ModifyNullable {
        /// Column name.
        column: String,
        /// Whether the column should accept NULL.
        nullable: bool,
    },
    /// Set or drop the default of an existing column.
    ModifyDefault {
        /// Column name.
        column: String,
        /// The change to apply.
        change: DefaultChange,
    },
    /// Rename the table.
    Rename {
        /// New table name.
        to: String,
    },
    /// Add a primary key.
    Primary(IndexCommand),
    /// Add a unique index.
    Unique(IndexCommand),
    /// Add a plain index.
    Index(IndexCommand),
    /// Add a foreign key.
    Foreign(ForeignKeyCommand),
    /// Drop the primary key.
    DropPrimary(IndexCommand),
    /// Drop a unique index.
    DropUnique(IndexCommand),
    /// Drop a plain index.
    DropIndex(IndexCommand),
    /// Drop a foreign key.
    DropForeign(IndexCommand),
}

impl Command {
    /// Returns the command name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Add => "add",
            Self::Drop => "drop",
            Self::DropIfExists => "drop_if_exists",
            Self::DropColumn { .. } => "drop_column",
            Self::RenameColumn { .. } => "rename_column",
            Self::ModifyColumn { .. } => "modify_column",
            Self::ModifyNullable { .. } => "modify_nullable",
            Self::ModifyDefault { .. } => "modify_default",
            Self::Rename { .. } => "rename",
            Self::Primary(_) => "primary",
            Self::Unique(_) => "unique",
            Self::Index(_) => "index",
            Self::Foreign(_) => "foreign",
            Self::DropPrimary(_) => "drop_primary",
            Self::DropUnique(_) => "drop_unique",
            Self::DropIndex(_) => "drop_index",
            Self::DropForeign(_) => "drop_foreign",
        }
    }
}

/// Change applied by a [`Command::ModifyDefault`].
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultChange {
    /// Remove the column default.
    Drop,
    /// Replace the column default.
    Set(DefaultValue),
}

/// Parameters of index creation and removal commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexCommand {
    /// Index name.
    pub index: String,
    /// Indexed columns. Empty when an index is dropped by name.
    pub columns: Vec<String>,
}

/// Parameters of a foreign key command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyCommand {
    /// Constraint name.
    pub index: String,
    /// Local columns.
    pub columns: Vec<String>,
    /// Referenced columns.
    pub references: Vec<String>,
    /// Referenced table.
    pub on: String,
    /// Action on delete (e.g. `cascade`).
    pub on_delete: Option<String>,
    /// Action on update.
    pub on_update: Option<String>,
}

impl ForeignKeyCommand {
    /// Creates a foreign key command with no target yet.
    #[must_use]
    pub fn new(index: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            index: index.into(),
            columns,
            references: Vec::new(),
            on: String::new(),
            on_delete: None,
            on_update: None,
        }
    }

    /// Sets the referenced columns.
    pub fn references(&mut self, columns: impl IntoColumns) -> &mut Self {
        self.references = columns.into_columns();
        self
    }

    /// Sets the referenced table.
    pub fn on(&mut self, table: impl Into<String>) -> &mut Self {
        self.on = table.into();
        self
    }

    /// Sets the action on delete.
    pub fn on_delete(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_delete = Some(action.into());
        self
    }

    /// Sets the action on update.
    pub fn on_update(&mut self, action: impl Into<String>) -> &mut Self {
        self.on_update = Some(action.into());
        self
    }
}

/// Conversion into an ordered list of column names.
///
/// Lets index constructors take one column or several.
pub trait IntoColumns {
    /// Converts into column names.
    fn into_columns(self) -> Vec<String>;
}

impl IntoColumns for &str {
    fn into_columns(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoColumns for String {
    fn into_columns(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoColumns for &[&str] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|&s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoColumns for [&str; N] {
    fn into_columns(self) -> Vec<String> {
        self.iter().map(|&s| s.to_string()).collect()
    }
}

impl IntoColumns for Vec<&str> {
    fn into_columns(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}

impl IntoColumns for Vec<String> {
    fn into_columns(self) -> Vec<String> {
        self
    }
}

/// Reference to an index being dropped: its name, or the columns it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexRef {
    /// Explicit index name.
    Name(String),
    /// Indexed columns; the conventional name is reconstructed from them.
    Columns(Vec<String>),
}

impl From<&str> for IndexRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for IndexRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl<const N: usize> From<[&str; N]> for IndexRef {
    fn from(columns: [&str; N]) -> Self {
        Self::Columns(columns.into_columns())
    }
}

impl From<&[&str]> for IndexRef {
    fn from(columns: &[&str]) -> Self {
        Self::Columns(columns.into_columns())
    }
}

impl From<Vec<String>> for IndexRef {
    fn from(columns: Vec<String>) -> Self {
        Self::Columns(columns)
    }
}
