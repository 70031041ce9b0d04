//! Snapshot parser
//!
//! Converts the raw table/column/index records supplied by the schema
//! source into structured [`Table`] values. The `db_type` strings follow
//! the usual MySQL shapes: `int(11) unsigned`, `decimal(14,5)`,
//! `enum('a','b')`.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::schema::types::{Column, ColumnType, Index, IndexSpec, PrimaryKey, Size, Table, Value};

/// Ordered map of table name to parsed definition. Used both for the
/// live snapshot and for the desired table set.
pub type Tables = IndexMap<String, Table>;

/// One column as reported by the schema source.
#[derive(Debug, Clone)]
pub struct RawColumn {
    pub name: String,
    pub db_type: String,
    pub allow_null: bool,
    pub default: Option<String>,
    pub primary_key: bool,
}

/// One table as reported by the schema source.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
    pub indexes: IndexMap<String, IndexSpec>,
}

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^(\s]+)").unwrap());
static SIZE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(([0-9, ]+)\)").unwrap());

/// Parses a full snapshot of raw tables.
pub fn parse_tables(raw: IndexMap<String, RawTable>) -> Result<Tables> {
    raw.into_iter()
        .map(|(name, table)| {
            let parsed = parse_table(&name, table)?;
            Ok((name, parsed))
        })
        .collect()
}

/// Parses one raw table into a [`Table`].
pub fn parse_table(name: &str, raw: RawTable) -> Result<Table> {
    let columns = raw
        .columns
        .iter()
        .map(|column| parse_column(name, column))
        .collect::<Result<Vec<_>>>()?;

    let key_columns: Vec<String> = raw
        .columns
        .iter()
        .filter(|column| column.primary_key)
        .map(|column| column.name.clone())
        .collect();
    let primary_key = match key_columns.len() {
        0 => None,
        1 => key_columns.into_iter().next().map(PrimaryKey::Single),
        _ => Some(PrimaryKey::Composite(key_columns)),
    };

    Ok(Table {
        name: name.to_string(),
        columns,
        indexes: Index::build_from_mapping(&raw.indexes),
        primary_key,
        table_options: None,
    })
}

/// Parses one raw column into a [`Column`].
pub fn parse_column(table: &str, raw: &RawColumn) -> Result<Column> {
    let column_type = parse_type(&raw.db_type).ok_or_else(|| Error::Parse {
        table: table.to_string(),
        column: raw.name.clone(),
        message: format!("unrecognized column type `{}`", raw.db_type),
    })?;

    Ok(Column {
        name: raw.name.clone(),
        null: raw.allow_null,
        default: typed_default(raw.default.as_deref(), &column_type),
        unsigned: extract_unsigned(&raw.db_type, &column_type),
        size: extract_size(&raw.db_type, &column_type),
        elements: extract_enum_elements(&raw.db_type, &column_type),
        column_type,
        single_primary_key: false,
    })
}

/// Returns a type tag for a `db_type` string.
///
/// `int(11)` is an integer, `tinyint(1)` a boolean, and otherwise the
/// leading token names the type.
pub fn parse_type(db_type: &str) -> Option<ColumnType> {
    if db_type.starts_with("tinyint(1)") {
        return Some(ColumnType::Boolean);
    }
    if db_type.starts_with("int") {
        return Some(ColumnType::Integer);
    }
    TOKEN_RE
        .captures(db_type)
        .map(|caps| ColumnType::from_token(&caps[1]))
}

// Unsigned is only meaningful for numeric types; for those it is an
// explicit true or false so a declared `unsigned: false` is not a diff.
fn extract_unsigned(db_type: &str, column_type: &ColumnType) -> Option<bool> {
    if !column_type.is_numeric() {
        return None;
    }
    Some(db_type.contains(" unsigned"))
}

// Integer display widths carry no size information and are skipped.
fn extract_size(db_type: &str, column_type: &ColumnType) -> Option<Size> {
    if column_type.is_integer() {
        return None;
    }
    let caps = SIZE_RE.captures(db_type)?;
    let parts: Vec<u32> = caps[1]
        .split(',')
        .map(|part| part.trim().parse().ok())
        .collect::<Option<_>>()?;
    match parts[..] {
        [width] => Some(Size::Width(width)),
        [precision, scale] => Some(Size::Precision(precision, scale)),
        _ => None,
    }
}

// Scans the quoted element list of an enum definition. A small scanner
// rather than a regex: literals may contain parentheses, doubled quotes
// and backslash escapes.
fn extract_enum_elements(db_type: &str, column_type: &ColumnType) -> Option<Vec<String>> {
    if *column_type != ColumnType::Enum {
        return None;
    }
    let start = db_type.find('(')? + 1;
    let end = db_type.rfind(')')?;
    if end <= start {
        return Some(Vec::new());
    }

    let mut elements = Vec::new();
    let mut current = String::new();
    let mut in_literal = false;
    let mut chars = db_type[start..end].chars().peekable();
    while let Some(c) = chars.next() {
        if !in_literal {
            if c == '\'' {
                in_literal = true;
            }
            continue;
        }
        match c {
            '\'' if chars.peek() == Some(&'\'') => {
                current.push('\'');
                chars.next();
            }
            '\'' => {
                in_literal = false;
                elements.push(std::mem::take(&mut current));
            }
            '\\' => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            _ => current.push(c),
        }
    }
    Some(elements)
}

// Coerces the raw default string to a typed value, mirroring what the
// database driver reports for each column type. Decimal defaults stay
// textual so later comparisons remain exact.
fn typed_default(raw: Option<&str>, column_type: &ColumnType) -> Option<Value> {
    let raw = raw?;
    if raw.eq_ignore_ascii_case("null") {
        return None;
    }
    let value = match column_type {
        t if t.is_integer() => raw
            .parse::<i64>()
            .map(Value::Int)
            .unwrap_or_else(|_| Value::Str(raw.to_string())),
        ColumnType::Boolean => match raw {
            "1" => Value::Bool(true),
            "0" => Value::Bool(false),
            other => Value::Str(other.to_string()),
        },
        ColumnType::Float | ColumnType::Double => raw
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::Str(raw.to_string())),
        _ => Value::Str(raw.to_string()),
    };
    Some(value)
}
