//! Type definitions for database schema objects
//!
//! Columns and indexes are value objects: they know how to compute a
//! semantic diff against another instance and how to render themselves as
//! migration statements. Everything here is strongly typed at the
//! boundary so no loose dictionary shape crosses into the diff engine.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Type tag for a column, as parsed from a `db_type` string or declared
/// in a table definition file. Unrecognized leading tokens are preserved
/// verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Integer,
    Tinyint,
    Smallint,
    Mediumint,
    Bigint,
    Decimal,
    Float,
    Double,
    Boolean,
    Varchar,
    Char,
    Text,
    Enum,
    Set,
    Timestamp,
    Datetime,
    Date,
    Time,
    Blob,
    Other(String),
}

impl ColumnType {
    /// Maps a type token to its tag. `numeric` is an alias for decimal.
    pub fn from_token(token: &str) -> Self {
        match token {
            "integer" => ColumnType::Integer,
            "tinyint" => ColumnType::Tinyint,
            "smallint" => ColumnType::Smallint,
            "mediumint" => ColumnType::Mediumint,
            "bigint" => ColumnType::Bigint,
            "decimal" | "numeric" => ColumnType::Decimal,
            "float" => ColumnType::Float,
            "double" => ColumnType::Double,
            "boolean" => ColumnType::Boolean,
            "varchar" => ColumnType::Varchar,
            "char" => ColumnType::Char,
            "text" => ColumnType::Text,
            "enum" => ColumnType::Enum,
            "set" => ColumnType::Set,
            "timestamp" => ColumnType::Timestamp,
            "datetime" => ColumnType::Datetime,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            "blob" => ColumnType::Blob,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// Numeric types carry an `unsigned` flag and have an implicit zero
    /// default when NOT NULL.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer
                | ColumnType::Tinyint
                | ColumnType::Smallint
                | ColumnType::Mediumint
                | ColumnType::Bigint
                | ColumnType::Decimal
                | ColumnType::Float
                | ColumnType::Double
        )
    }

    /// Integer types never carry size information; their parenthesized
    /// display widths are cosmetic.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer
                | ColumnType::Tinyint
                | ColumnType::Smallint
                | ColumnType::Mediumint
                | ColumnType::Bigint
        )
    }

    fn as_str(&self) -> &str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Tinyint => "tinyint",
            ColumnType::Smallint => "smallint",
            ColumnType::Mediumint => "mediumint",
            ColumnType::Bigint => "bigint",
            ColumnType::Decimal => "decimal",
            ColumnType::Float => "float",
            ColumnType::Double => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::Varchar => "varchar",
            ColumnType::Char => "char",
            ColumnType::Text => "text",
            ColumnType::Enum => "enum",
            ColumnType::Set => "set",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Datetime => "datetime",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::Blob => "blob",
            ColumnType::Other(token) => token,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ColumnType {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ColumnType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        Ok(ColumnType::from_token(&token))
    }
}

/// A scalar column default, as introspected or declared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    /// Renders the value as a statement literal.
    pub fn literal(&self) -> String {
        match self {
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Str(s) => quote(s),
        }
    }

    fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Int(n) => Some(Decimal::from(*n)),
            Value::Float(x) => Decimal::from_f64(*x),
            Value::Str(s) => s.trim().parse().ok(),
            Value::Bool(_) => None,
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Value::Str(s) if s.is_empty())
    }
}

/// Column size: a display width, or a (precision, scale) pair for
/// fixed-point types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Size {
    Width(u32),
    Precision(u32, u32),
}

impl Size {
    fn literal(&self) -> String {
        match self {
            Size::Width(width) => width.to_string(),
            Size::Precision(precision, scale) => format!("[{}, {}]", precision, scale),
        }
    }
}

/// Attribute tags reported by [`Column::diff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColumnAttr {
    Name,
    ColumnType,
    Null,
    Default,
    Unsigned,
    Size,
    Elements,
}

/// A column in a database table.
///
/// Responsible for rendering all migration statements used by the
/// operation variants. Columns are immutable once constructed; a changed
/// column is always a newly built value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    // Named `nullable` in definition files: a bare `null` key is the
    // YAML null value, not a field name.
    #[serde(default, rename = "nullable")]
    pub null: bool,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub unsigned: Option<bool>,
    #[serde(default)]
    pub size: Option<Size>,
    #[serde(default)]
    pub elements: Option<Vec<String>>,
    #[serde(skip)]
    pub single_primary_key: bool,
}

impl Column {
    /// A copy of this column flagged as the table's sole single-column
    /// primary key, which changes how `define_statement` renders it.
    pub fn with_single_primary_key(&self) -> Column {
        let mut column = self.clone();
        column.single_primary_key = true;
        column
    }

    /// Returns the attributes that differ between this and another
    /// column.
    ///
    /// Comparators are attribute specific: null and unsigned are
    /// boolean-coerced before comparison, size only counts when both
    /// sides constrain it, and defaults go through the normalization
    /// rules in `default_differs`.
    pub fn diff(&self, other: &Column) -> BTreeSet<ColumnAttr> {
        let mut diffs = BTreeSet::new();
        if self.name != other.name {
            diffs.insert(ColumnAttr::Name);
        }
        if self.column_type != other.column_type {
            diffs.insert(ColumnAttr::ColumnType);
        }
        if self.null != other.null {
            diffs.insert(ColumnAttr::Null);
        }
        if self.unsigned.unwrap_or(false) != other.unsigned.unwrap_or(false) {
            diffs.insert(ColumnAttr::Unsigned);
        }
        if let (Some(ours), Some(theirs)) = (self.size, other.size) {
            if ours != theirs {
                diffs.insert(ColumnAttr::Size);
            }
        }
        if self.elements != other.elements {
            diffs.insert(ColumnAttr::Elements);
        }
        if self.default_differs(other) {
            diffs.insert(ColumnAttr::Default);
        }
        diffs
    }

    // A NOT NULL numeric column's missing default is zero at the database
    // level, and a NOT NULL string-ish column's missing default is the
    // empty string. Nullable columns compare defaults verbatim, since nil
    // vs non-nil is a real difference there. Decimal comparison is exact,
    // never through floating point.
    fn default_differs(&self, other: &Column) -> bool {
        if self.null || other.null {
            return self.default != other.default;
        }
        if self.column_type.is_numeric() && other.column_type.is_numeric() {
            let ours = decimal_or_zero(self.default.as_ref());
            let theirs = decimal_or_zero(other.default.as_ref());
            return match (ours, theirs) {
                (Some(a), Some(b)) => a != b,
                _ => self.default != other.default,
            };
        }
        let ours = self.default.as_ref().filter(|v| !v.is_blank());
        let theirs = other.default.as_ref().filter(|v| !v.is_blank());
        ours != theirs
    }

    /// Statement defining the column inline in a `create_table` block.
    pub fn define_statement(&self) -> String {
        let head = if self.single_primary_key {
            format!("primary_key {}, type: {}", self.name, self.column_type)
        } else {
            format!("{} {}", self.column_type, self.name)
        };
        with_options(head, self.options())
    }

    /// Statement adding the column in an `alter_table` block.
    pub fn add_statement(&self) -> String {
        let head = format!("add_column {}, {}", self.name, self.column_type);
        with_options(head, self.options())
    }

    /// Statement removing the column.
    pub fn drop_statement(&self) -> String {
        format!("drop_column {}", self.name)
    }

    /// Statement changing whether the column allows null values.
    pub fn change_null_statement(&self) -> String {
        format!("set_column_allow_null {}, {}", self.name, self.null)
    }

    /// Statement changing the column's default value.
    pub fn change_default_statement(&self) -> String {
        format!(
            "set_column_default {}, {}",
            self.name,
            render_default(&self.default)
        )
    }

    /// Statement changing the column's type. Re-specifies default, size,
    /// unsigned and elements, since a type change resets them at the
    /// database level. Null changes are always issued separately.
    pub fn change_type_statement(&self) -> String {
        format!(
            "set_column_type {}, {}, {}",
            self.name,
            self.column_type,
            self.change_options()
        )
    }

    // Option suffix for define/add statements, in fixed order: null,
    // default, unsigned, size, elements.
    fn options(&self) -> Option<String> {
        let mut opts = Vec::new();
        if !self.null {
            opts.push("null: false".to_string());
        }
        if self.default.is_some() || self.column_type == ColumnType::Timestamp {
            opts.push(format!("default: {}", render_default(&self.default)));
        }
        if self.unsigned == Some(true) {
            opts.push("unsigned: true".to_string());
        }
        if let Some(size) = self.size {
            opts.push(format!("size: {}", size.literal()));
        }
        if let Some(elements) = &self.elements {
            opts.push(format!("elements: {}", render_elements(elements)));
        }
        if opts.is_empty() {
            None
        } else {
            Some(opts.join(", "))
        }
    }

    // Option suffix for type changes. The default is always restated,
    // and unsigned is emitted whenever it is an explicit boolean, even
    // false.
    fn change_options(&self) -> String {
        let mut opts = vec![format!("default: {}", render_default(&self.default))];
        if let Some(unsigned) = self.unsigned {
            opts.push(format!("unsigned: {}", unsigned));
        }
        if let Some(size) = self.size {
            opts.push(format!("size: {}", size.literal()));
        }
        if let Some(elements) = &self.elements {
            opts.push(format!("elements: {}", render_elements(elements)));
        }
        opts.join(", ")
    }
}

/// A single-column or composite primary key declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryKey {
    Single(String),
    Composite(Vec<String>),
}

impl PrimaryKey {
    /// The key's columns, in declaration order.
    pub fn columns(&self) -> &[String] {
        match self {
            PrimaryKey::Single(name) => std::slice::from_ref(name),
            PrimaryKey::Composite(columns) => columns,
        }
    }
}

/// One column name or a list of them, as written in an index definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnList {
    One(String),
    Many(Vec<String>),
}

impl ColumnList {
    fn to_vec(&self) -> Vec<String> {
        match self {
            ColumnList::One(name) => vec![name.clone()],
            ColumnList::Many(names) => names.clone(),
        }
    }
}

/// Raw index attributes as they appear in a definition file or an
/// introspected index mapping. Indexes are not unique by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSpec {
    pub columns: ColumnList,
    #[serde(default)]
    pub unique: bool,
}

/// A named index over one or more columns.
///
/// Two indexes are equal only if name, column list and uniqueness all
/// match. Set difference on full equality is what classifies an index
/// that kept its name but changed its definition as removed + added
/// rather than unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    /// Normalizes a name → attributes mapping into index values. A
    /// scalar column spec is promoted to a one-element list.
    pub fn build_from_mapping(definitions: &IndexMap<String, IndexSpec>) -> Vec<Index> {
        definitions
            .iter()
            .map(|(name, spec)| Index {
                name: name.clone(),
                columns: spec.columns.to_vec(),
                unique: spec.unique,
            })
            .collect()
    }

    /// Returns true if this index has more than one column.
    pub fn multi_column(&self) -> bool {
        self.columns.len() > 1
    }

    /// Statement defining the index in a `create_table` block.
    pub fn define_statement(&self) -> String {
        self.base_add_statement("index")
    }

    /// Statement adding the index in an `alter_table` block.
    pub fn add_statement(&self) -> String {
        self.base_add_statement("add_index")
    }

    /// Statement removing the index in an `alter_table` block.
    pub fn drop_statement(&self) -> String {
        format!("drop_index {}, name: {}", self.columns_for_statement(), self.name)
    }

    fn columns_for_statement(&self) -> String {
        if self.multi_column() {
            format!("[{}]", self.columns.join(", "))
        } else {
            self.columns[0].clone()
        }
    }

    fn base_add_statement(&self, keyword: &str) -> String {
        let mut statement = format!(
            "{} {}, name: {}",
            keyword,
            self.columns_for_statement(),
            self.name
        );
        if self.unique {
            statement.push_str(", unique: true");
        }
        statement
    }
}

/// A table definition: columns in declaration order, indexes in mapping
/// order, and an optional primary key and engine options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
    pub primary_key: Option<PrimaryKey>,
    pub table_options: Option<IndexMap<String, Value>>,
}

fn render_default(default: &Option<Value>) -> String {
    match default {
        Some(value) => value.literal(),
        None => "null".to_string(),
    }
}

fn render_elements(elements: &[String]) -> String {
    let quoted: Vec<String> = elements.iter().map(|e| quote(e)).collect();
    format!("[{}]", quoted.join(", "))
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

fn with_options(head: String, options: Option<String>) -> String {
    match options {
        Some(options) => format!("{}, {}", head, options),
        None => head,
    }
}

fn decimal_or_zero(value: Option<&Value>) -> Option<Decimal> {
    match value {
        None => Some(Decimal::ZERO),
        Some(value) => value.as_decimal(),
    }
}
