//! Column descriptors.
//!
//! A [`ColumnSpec`] is appended to a blueprint by one of the column
//! constructors and then refined in place through the fluent modifier
//! methods until the blueprint is compiled.

use crate::grammar::quote_string;

/// Abstract column types understood by every grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// Fixed-length string.
    Char,
    /// Variable-length string.
    String,
    /// Text.
    Text,
    /// Medium text.
    MediumText,
    /// Long text.
    LongText,
    /// JSON document.
    Json,
    /// Integer (32-bit).
    Integer,
    /// Big integer (64-bit).
    BigInteger,
    /// Medium integer (24-bit on MySQL).
    MediumInteger,
    /// Small integer (16-bit).
    SmallInteger,
    /// Tiny integer (8-bit).
    TinyInteger,
    /// Single precision float.
    Float,
    /// Double precision float.
    Double,
    /// Fixed precision decimal.
    Decimal,
    /// Boolean.
    Boolean,
    /// Enumeration of allowed string values.
    Enum,
    /// Date only.
    Date,
    /// Date and time.
    DateTime,
    /// Time only.
    Time,
    /// Timestamp.
    Timestamp,
    /// Binary large object.
    Binary,
}

impl ColumnType {
    /// Returns the snake_case name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Char => "char",
            Self::String => "string",
            Self::Text => "text",
            Self::MediumText => "medium_text",
            Self::LongText => "long_text",
            Self::Json => "json",
            Self::Integer => "integer",
            Self::BigInteger => "big_integer",
            Self::MediumInteger => "medium_integer",
            Self::SmallInteger => "small_integer",
            Self::TinyInteger => "tiny_integer",
            Self::Float => "float",
            Self::Double => "double",
            Self::Decimal => "decimal",
            Self::Boolean => "boolean",
            Self::Enum => "enum",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Time => "time",
            Self::Timestamp => "timestamp",
            Self::Binary => "binary",
        }
    }
}

/// Default value for a column.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// Boolean default, rendered as `'0'` or `'1'`.
    Boolean(bool),
    /// Integer default.
    Integer(i64),
    /// Float default.
    Float(f64),
    /// String default.
    String(String),
    /// Raw SQL expression (e.g., CURRENT_TIMESTAMP), rendered verbatim.
    Expression(String),
}

impl DefaultValue {
    /// Creates a raw SQL expression default.
    #[must_use]
    pub fn expression(expr: impl Into<String>) -> Self {
        Self::Expression(expr.into())
    }

    /// Returns the SQL representation used in `default` clauses.
    ///
    /// Everything except raw expressions is single-quoted.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match self {
            Self::Boolean(b) => format!("'{}'", u8::from(*b)),
            Self::Integer(i) => format!("'{i}'"),
            Self::Float(f) => format!("'{f}'"),
            Self::String(s) => quote_string(s),
            Self::Expression(expr) => expr.clone(),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for DefaultValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// An inline index marker on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMarker {
    /// Index with a synthesized name.
    Unnamed,
    /// Index with an explicit name.
    Named(String),
}

impl IndexMarker {
    /// Returns the explicit name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Unnamed => None,
            Self::Named(name) => Some(name),
        }
    }
}

/// A column definition accumulated by a blueprint.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Abstract column type.
    pub column_type: ColumnType,
    /// Length for char and string columns.
    pub length: Option<u32>,
    /// Total digits for float, double and decimal columns.
    pub total: Option<u32>,
    /// Digits after the decimal point.
    pub places: Option<u32>,
    /// Allowed values for enum columns.
    pub allowed: Vec<String>,
    /// Whether the column is unsigned.
    pub unsigned: bool,
    /// Whether the column accepts NULL.
    pub nullable: bool,
    /// Default value.
    pub default: Option<DefaultValue>,
    /// Whether the column auto-increments.
    pub auto_increment: bool,
    /// Column to place this one after (MySQL).
    pub after: Option<String>,
    /// Inline primary key marker.
    pub primary: Option<IndexMarker>,
    /// Inline unique index marker.
    pub unique: Option<IndexMarker>,
    /// Inline plain index marker.
    pub index: Option<IndexMarker>,
}

impl ColumnSpec {
    /// Creates a new column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            length: None,
            total: None,
            places: None,
            allowed: Vec::new(),
            unsigned: false,
            nullable: false,
            default: None,
            auto_increment: false,
            after: None,
            primary: None,
            unique: None,
            index: None,
        }
    }

    /// Returns why the definition cannot be compiled, if it cannot.
    #[must_use]
    pub fn invalid_reason(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            return Some("column name is empty");
        }
        if self.column_type == ColumnType::Enum && self.allowed.is_empty() {
            return Some("enum column has no allowed values");
        }
        None
    }

    /// Marks the column as nullable.
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Sets the default value.
    pub fn default(&mut self, value: impl Into<DefaultValue>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    /// Sets a raw SQL expression as default.
    pub fn default_expr(&mut self, expr: impl Into<String>) -> &mut Self {
        self.default = Some(DefaultValue::Expression(expr.into()));
        self
    }

    /// Marks the column as unsigned.
    pub fn unsigned(&mut self) -> &mut Self {
        self.unsigned = true;
        self
    }

    /// Marks the column as auto-incrementing.
    pub fn auto_increment(&mut self) -> &mut Self {
        self.auto_increment = true;
        self
    }

    /// Places the column after another one.
    pub fn after(&mut self, column: impl Into<String>) -> &mut Self {
        self.after = Some(column.into());
        self
    }

    /// Adds a primary key on this column.
    pub fn primary(&mut self) -> &mut Self {
        self.primary = Some(IndexMarker::Unnamed);
        self
    }

    /// Adds a named primary key on this column.
    pub fn primary_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.primary = Some(IndexMarker::Named(name.into()));
        self
    }

    /// Adds a unique index on this column.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = Some(IndexMarker::Unnamed);
        self
    }

    /// Adds a named unique index on this column.
    pub fn unique_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.unique = Some(IndexMarker::Named(name.into()));
        self
    }

    /// Adds a plain index on this column.
    pub fn index(&mut self) -> &mut Self {
        self.index = Some(IndexMarker::Unnamed);
        self
    }

    /// Adds a named plain index on this column.
    pub fn index_named(&mut self, name: impl Into<String>) -> &mut Self {
        self.index = Some(IndexMarker::Named(name.into()));
        self
    }
}
