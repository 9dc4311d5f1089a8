//! The schema-introspection boundary.
//!
//! Renaming a column, and dropping one on SQLite, cannot be expressed from
//! the blueprint alone. The grammar reads the live column metadata through an
//! [`Introspector`], builds a [`TableDiff`] and lets the introspector's
//! platform adapter render it.

use crate::error::{Result, SchemaError};

/// Metadata of an existing column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name.
    pub name: String,
    /// Native type as reported by the database (e.g. `varchar(255)`).
    pub native_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default expression as reported by the database.
    pub default: Option<String>,
    /// Whether the column is part of the primary key.
    pub primary_key: bool,
}

impl ColumnMetadata {
    /// Creates metadata for a nullable, non-key column without default.
    #[must_use]
    pub fn new(name: impl Into<String>, native_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            native_type: native_type.into(),
            nullable: true,
            default: None,
            primary_key: false,
        }
    }

    /// Returns a copy of this column under a new name.
    #[must_use]
    pub fn renamed(&self, to: impl Into<String>) -> Self {
        Self {
            name: to.into(),
            ..self.clone()
        }
    }
}

/// A requested change to an existing table.
///
/// Renamed and removed columns keep the order in which they were requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDiff {
    /// Table name, with prefix.
    pub table: String,
    /// Current columns of the table.
    pub from_table: Vec<ColumnMetadata>,
    /// Old column name mapped to the column's new definition.
    pub renamed_columns: Vec<(String, ColumnMetadata)>,
    /// Column name mapped to the metadata of the column being removed.
    pub removed_columns: Vec<(String, ColumnMetadata)>,
}

impl TableDiff {
    /// Creates an empty diff against the current columns of a table.
    #[must_use]
    pub fn new(table: impl Into<String>, from_table: Vec<ColumnMetadata>) -> Self {
        Self {
            table: table.into(),
            from_table,
            renamed_columns: Vec::new(),
            removed_columns: Vec::new(),
        }
    }

    /// Returns `true` if the diff requests no change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.renamed_columns.is_empty() && self.removed_columns.is_empty()
    }
}

/// Reads live schema metadata and renders table diffs as ALTER SQL.
pub trait Introspector {
    /// Returns the columns of a table in ordinal order.
    fn describe_table(&self, table: &str) -> Result<Vec<ColumnMetadata>>;

    /// Returns the metadata of one column.
    fn column(&self, table: &str, name: &str) -> Result<ColumnMetadata> {
        self.describe_table(table)?
            .into_iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SchemaError::ColumnNotFound {
                table: table.to_string(),
                column: name.to_string(),
            })
    }

    /// Renders the ALTER statements that apply a diff.
    fn alter_table_sql(&self, diff: &TableDiff) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<ColumnMetadata>);

    impl Introspector for Fixed {
        fn describe_table(&self, _table: &str) -> Result<Vec<ColumnMetadata>> {
            Ok(self.0.clone())
        }

        fn alter_table_sql(&self, _diff: &TableDiff) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_column_lookup() {
        let introspector = Fixed(vec![
            ColumnMetadata::new("id", "integer"),
            ColumnMetadata::new("name", "varchar"),
        ]);

        let column = introspector.column("users", "name").unwrap();
        assert_eq!(column.native_type, "varchar");

        let err = introspector.column("users", "missing").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::ColumnNotFound { ref table, ref column } if table == "users" && column == "missing"
        ));
    }

    #[test]
    fn test_renamed_keeps_attributes() {
        let mut column = ColumnMetadata::new("name", "varchar(255)");
        column.nullable = false;
        column.default = Some("'x'".into());

        let renamed = column.renamed("title");
        assert_eq!(renamed.name, "title");
        assert_eq!(renamed.native_type, "varchar(255)");
        assert!(!renamed.nullable);
        assert_eq!(renamed.default.as_deref(), Some("'x'"));
    }

    #[test]
    fn test_empty_diff() {
        let diff = TableDiff::new("users", Vec::new());
        assert!(diff.is_empty());
    }
}
