//! Migration builder
//!
//! Assembles the ordered, reversible migration script from a snapshot of
//! the live database and the desired table set. Tables are always
//! visited in lexicographic name order so the output is reproducible.

use crate::schema::diff::AlterTableOperations;
use crate::schema::operations::Operation;
use crate::schema::parser::Tables;
use crate::schema::types::{Column, PrimaryKey, Table};

const INDENT: &str = "  ";

/// A generated migration: the forward and inverse statement bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub up: Vec<String>,
    pub down: Vec<String>,
}

impl Migration {
    /// Returns true when the schemas were already in sync.
    pub fn is_empty(&self) -> bool {
        self.up.is_empty() && self.down.is_empty()
    }

    /// Renders the full migration script.
    pub fn script(&self) -> String {
        let mut buf = Lines::new();
        buf.add("migration do");
        buf.indented(|buf| {
            buf.add("up do");
            buf.indented(|buf| buf.append(&self.up));
            buf.add("end");
            buf.blank();
            buf.add("down do");
            buf.indented(|buf| buf.append(&self.down));
            buf.add("end");
        });
        buf.add("end");
        buf.into_string()
    }
}

/// Builds migrations against one parsed snapshot of the live database.
///
/// The builder holds only the immutable snapshot; every generation call
/// uses its own accumulator, so one builder can serve repeated,
/// independent calls.
pub struct MigrationBuilder {
    db_tables: Tables,
}

impl MigrationBuilder {
    /// Creates a migration builder for the given snapshot.
    pub fn new(db_tables: Tables) -> Self {
        Self { db_tables }
    }

    /// Generates the migration bringing the live schema in line with the
    /// desired tables.
    ///
    /// Returns `None` when the desired set is empty and the database has
    /// no tables, i.e. there is nothing to migrate. A migration with
    /// empty bodies means both sides exist and already match.
    pub fn generate_migration(&self, desired: &Tables) -> Option<Migration> {
        if desired.is_empty() && self.db_tables.is_empty() {
            return None;
        }

        let mut names: Vec<&str> = desired.keys().map(String::as_str).collect();
        names.sort_unstable();
        let (existing, new): (Vec<&str>, Vec<&str>) = names
            .into_iter()
            .partition(|name| self.db_tables.contains_key(*name));

        let alterations: Vec<(&str, Vec<Operation>)> = existing
            .iter()
            .filter_map(|name| {
                let operations =
                    AlterTableOperations::build(&self.db_tables[*name], &desired[*name]);
                if operations.is_empty() {
                    None
                } else {
                    Some((*name, operations))
                }
            })
            .collect();

        let mut up_blocks: Vec<Vec<String>> = new
            .iter()
            .map(|name| create_table_block(&desired[*name]))
            .collect();
        for (name, operations) in &alterations {
            up_blocks.push(alter_table_block(name, operations, false));
        }

        let mut down_blocks: Vec<Vec<String>> = alterations
            .iter()
            .map(|(name, operations)| alter_table_block(name, operations, true))
            .collect();
        if !new.is_empty() {
            // New tables are dropped in reverse of their creation order.
            down_blocks.push(
                new.iter()
                    .rev()
                    .map(|name| format!("drop_table {}", name))
                    .collect(),
            );
        }

        Some(Migration {
            up: join_blocks(up_blocks),
            down: join_blocks(down_blocks),
        })
    }
}

/// Renders one create-table block: columns in declaration order, then
/// indexes, then a trailing primary key statement unless the key was
/// folded into its column's own declaration.
fn create_table_block(table: &Table) -> Vec<String> {
    let mut buf = Lines::new();
    buf.add(format!(
        "create_table {}{} do",
        table.name,
        table_options_suffix(table)
    ));
    buf.indented(|buf| {
        let mut folded = false;
        for column in &table.columns {
            if inline_primary_key(table.primary_key.as_ref(), column) {
                folded = true;
                buf.add(column.with_single_primary_key().define_statement());
            } else {
                buf.add(column.define_statement());
            }
        }
        if !table.indexes.is_empty() {
            buf.blank();
            for index in &table.indexes {
                buf.add(index.define_statement());
            }
        }
        if let Some(primary_key) = &table.primary_key {
            if !folded {
                buf.blank();
                buf.add(format!(
                    "primary_key [{}]",
                    primary_key.columns().join(", ")
                ));
            }
        }
    });
    buf.add("end");
    buf.into_lines()
}

fn alter_table_block(name: &str, operations: &[Operation], down: bool) -> Vec<String> {
    let mut buf = Lines::new();
    buf.add(format!("alter_table {} do", name));
    buf.indented(|buf| {
        for operation in operations {
            buf.add(if down { operation.down() } else { operation.up() });
        }
    });
    buf.add("end");
    buf.into_lines()
}

// A single-column integer primary key is folded into the column's own
// inline declaration.
fn inline_primary_key(primary_key: Option<&PrimaryKey>, column: &Column) -> bool {
    primary_key.map_or(false, |key| {
        key.columns().len() == 1
            && key.columns()[0] == column.name
            && column.column_type.is_integer()
    })
}

fn table_options_suffix(table: &Table) -> String {
    match &table.table_options {
        Some(options) if !options.is_empty() => {
            let rendered: Vec<String> = options
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value.literal()))
                .collect();
            format!(", {}", rendered.join(", "))
        }
        _ => String::new(),
    }
}

fn join_blocks(blocks: Vec<Vec<String>>) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, block) in blocks.into_iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.extend(block);
    }
    lines
}

// Call-scoped line accumulator: each generation pass owns its own
// buffer, never the builder.
struct Lines {
    out: Vec<String>,
    level: usize,
}

impl Lines {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            level: 0,
        }
    }

    fn add(&mut self, line: impl AsRef<str>) {
        self.out
            .push(format!("{}{}", INDENT.repeat(self.level), line.as_ref()));
    }

    fn blank(&mut self) {
        self.out.push(String::new());
    }

    // Re-indents pre-rendered lines under the current level, keeping
    // blank lines blank.
    fn append(&mut self, lines: &[String]) {
        for line in lines {
            if line.is_empty() {
                self.blank();
            } else {
                self.add(line);
            }
        }
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.level += 1;
        f(self);
        self.level -= 1;
    }

    fn into_lines(self) -> Vec<String> {
        self.out
    }

    fn into_string(self) -> String {
        let mut script = self.out.join("\n");
        script.push('\n');
        script
    }
}
