//! Desired-schema loader
//!
//! Reads user-declared table definitions from a YAML file. The file is a
//! mapping of table name to columns, indexes, primary key and table
//! options; deserialization produces strongly typed values directly, so
//! nothing downstream deals with loose mappings.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Result;
use crate::schema::parser::Tables;
use crate::schema::types::{Column, Index, IndexSpec, PrimaryKey, Table, Value};

/// One table as declared in a definition file. The table name is the
/// mapping key and is filled in by the loader.
#[derive(Debug, Clone, Deserialize)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: IndexMap<String, IndexSpec>,
    #[serde(default)]
    pub primary_key: Option<PrimaryKey>,
    #[serde(default)]
    pub table_options: Option<IndexMap<String, Value>>,
}

impl TableSpec {
    fn into_table(self, name: &str) -> Table {
        Table {
            name: name.to_string(),
            indexes: Index::build_from_mapping(&self.indexes),
            columns: self.columns,
            primary_key: self.primary_key,
            table_options: self.table_options,
        }
    }
}

/// Loads the desired table set from a YAML definition file.
pub fn load_tables(path: &Path) -> Result<Tables> {
    let text = fs::read_to_string(path)?;
    parse_tables_str(&text)
}

/// Parses the desired table set from YAML text.
pub fn parse_tables_str(text: &str) -> Result<Tables> {
    let specs: IndexMap<String, TableSpec> = serde_yaml::from_str(text)?;
    Ok(specs
        .into_iter()
        .map(|(name, spec)| {
            let table = spec.into_table(&name);
            (name, table)
        })
        .collect())
}
