//! Table-level diff engine
//!
//! Compares an existing table against its desired definition and
//! produces the ordered operation list for one alter-table block.

use std::collections::{HashMap, HashSet};

use crate::schema::operations::{ChangeKind, Operation};
use crate::schema::types::{Column, ColumnAttr, Table};

/// Builds the operations needed to change an existing database table to
/// match its desired definition.
pub struct AlterTableOperations;

impl AlterTableOperations {
    /// Returns the ordered operation list: column changes in desired
    /// declaration order, then column drops in existing order, then
    /// index drops, then index adds. Indexes identical on both sides
    /// never appear.
    pub fn build(existing: &Table, desired: &Table) -> Vec<Operation> {
        let existing_by_name: HashMap<&str, &Column> = existing
            .columns
            .iter()
            .map(|column| (column.name.as_str(), column))
            .collect();
        let desired_names: HashSet<&str> = desired
            .columns
            .iter()
            .map(|column| column.name.as_str())
            .collect();

        let mut operations = Vec::new();
        for column in &desired.columns {
            match existing_by_name.get(column.name.as_str()) {
                Some(current) => {
                    operations.extend(Self::build_column_operations(current, column))
                }
                None => operations.push(Operation::AddColumn(column.clone())),
            }
        }

        let dropped: Vec<&Column> = existing
            .columns
            .iter()
            .filter(|column| !desired_names.contains(column.name.as_str()))
            .collect();
        let dropped_names: HashSet<&str> =
            dropped.iter().map(|column| column.name.as_str()).collect();
        for column in &dropped {
            operations.push(Operation::DropColumn((*column).clone()));
        }

        for index in existing
            .indexes
            .iter()
            .filter(|index| !desired.indexes.contains(index))
        {
            // Dropping a column already removes an index that covered
            // only dropped columns.
            if index
                .columns
                .iter()
                .all(|column| dropped_names.contains(column.as_str()))
            {
                continue;
            }
            operations.push(Operation::DropIndex(index.clone()));
        }
        for index in desired
            .indexes
            .iter()
            .filter(|index| !existing.indexes.contains(index))
        {
            operations.push(Operation::AddIndex(index.clone()));
        }

        operations
    }

    /// Returns the operations changing one column: at most one type or
    /// default operation, plus an independent null operation.
    ///
    /// A type change restates the default, so a default change rides
    /// along with it rather than being issued against the old type.
    pub fn build_column_operations(existing: &Column, desired: &Column) -> Vec<Operation> {
        let diffs = existing.diff(desired);

        let mut kinds = Vec::new();
        if [
            ColumnAttr::Elements,
            ColumnAttr::ColumnType,
            ColumnAttr::Size,
            ColumnAttr::Unsigned,
        ]
        .iter()
        .any(|attr| diffs.contains(attr))
        {
            kinds.push(ChangeKind::Type);
        }
        if diffs.contains(&ColumnAttr::Default) && kinds.is_empty() {
            kinds.push(ChangeKind::Default);
        }
        if diffs.contains(&ColumnAttr::Null) {
            kinds.push(ChangeKind::Null);
        }

        kinds
            .into_iter()
            .map(|kind| Operation::ChangeColumn {
                from: existing.clone(),
                to: desired.clone(),
                kind,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::schema::types::{ColumnType, Index, Size, Value};

    fn column(name: &str, column_type: ColumnType) -> Column {
        Column {
            name: name.to_string(),
            column_type,
            null: false,
            default: None,
            unsigned: None,
            size: None,
            elements: None,
            single_primary_key: false,
        }
    }

    fn table(name: &str, columns: Vec<Column>, indexes: Vec<Index>) -> Table {
        Table {
            name: name.to_string(),
            columns,
            indexes,
            primary_key: None,
            table_options: None,
        }
    }

    fn index(name: &str, columns: &[&str], unique: bool) -> Index {
        Index {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
        }
    }

    #[test]
    fn identical_columns_produce_no_operations() {
        let a = column("foo", ColumnType::Integer);
        let b = column("foo", ColumnType::Integer);
        assert!(AlterTableOperations::build_column_operations(&a, &b).is_empty());
    }

    #[test]
    fn a_type_difference_produces_one_type_change() {
        let a = column("foo", ColumnType::Integer);
        let b = column("foo", ColumnType::Smallint);
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].up(), "set_column_type foo, smallint, default: null");
        assert_eq!(ops[0].down(), "set_column_type foo, integer, default: null");
    }

    #[test]
    fn a_size_difference_produces_a_type_change() {
        let mut a = column("foo", ColumnType::Char);
        a.size = Some(Size::Width(20));
        let mut b = column("foo", ColumnType::Char);
        b.size = Some(Size::Width(10));
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(
            ops[0].up(),
            "set_column_type foo, char, default: null, size: 10"
        );
    }

    #[test]
    fn an_unsigned_difference_produces_a_type_change() {
        let mut a = column("foo", ColumnType::Integer);
        a.unsigned = Some(true);
        let mut b = column("foo", ColumnType::Integer);
        b.unsigned = Some(false);
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(
            ops[0].up(),
            "set_column_type foo, integer, default: null, unsigned: false"
        );
    }

    #[test]
    fn an_element_difference_produces_a_type_change() {
        let mut a = column("foo", ColumnType::Enum);
        a.elements = Some(vec!["A".to_string()]);
        let mut b = column("foo", ColumnType::Enum);
        b.elements = Some(vec!["A".to_string(), "B".to_string()]);
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(
            ops[0].up(),
            "set_column_type foo, enum, default: null, elements: [\"A\", \"B\"]"
        );
    }

    #[test]
    fn a_null_difference_produces_a_null_change() {
        let mut a = column("foo", ColumnType::Integer);
        a.null = true;
        let b = column("foo", ColumnType::Integer);
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].up(), "set_column_allow_null foo, false");
        assert_eq!(ops[0].down(), "set_column_allow_null foo, true");
    }

    #[test]
    fn a_default_difference_produces_a_default_change() {
        let mut a = column("foo", ColumnType::Integer);
        a.default = Some(Value::Int(1));
        let mut b = column("foo", ColumnType::Integer);
        b.default = Some(Value::Int(2));
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].up(), "set_column_default foo, 2");
        assert_eq!(ops[0].down(), "set_column_default foo, 1");
    }

    #[test]
    fn a_default_change_folds_into_a_type_change() {
        let mut a = column("foo", ColumnType::Integer);
        a.default = Some(Value::Int(1));
        let mut b = column("foo", ColumnType::Smallint);
        b.default = Some(Value::Int(2));
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].up(), "set_column_type foo, smallint, default: 2");
    }

    #[test]
    fn type_and_default_changes_come_before_null_changes() {
        let mut a = column("foo", ColumnType::Smallint);
        a.null = true;
        a.default = Some(Value::Int(10));
        a.unsigned = Some(true);
        let b = column("foo", ColumnType::Integer);
        let ops = AlterTableOperations::build_column_operations(&a, &b);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].up(), "set_column_type foo, integer, default: null");
        assert_eq!(ops[1].up(), "set_column_allow_null foo, false");
        assert_eq!(
            ops[0].down(),
            "set_column_type foo, smallint, default: 10, unsigned: true"
        );
        assert_eq!(ops[1].down(), "set_column_allow_null foo, true");
    }

    #[test]
    fn nothing_different_produces_no_operations() {
        let a = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![],
        );
        let b = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![],
        );
        assert!(AlterTableOperations::build(&a, &b).is_empty());
    }

    #[test]
    fn a_new_column_produces_an_add() {
        let a = table("example_table", vec![], vec![]);
        let b = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![],
        );
        let ops = AlterTableOperations::build(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].up(), "add_column foo, integer, null: false");
        assert_eq!(ops[0].down(), "drop_column foo");
    }

    #[test]
    fn a_removed_column_produces_a_drop() {
        let a = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![],
        );
        let b = table("example_table", vec![], vec![]);
        let ops = AlterTableOperations::build(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].up(), "drop_column foo");
        assert_eq!(ops[0].down(), "add_column foo, integer, null: false");
    }

    #[test]
    fn identical_indexes_produce_no_operations() {
        let a = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![index("foo_idx", &["foo"], false)],
        );
        let b = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![index("foo_idx", &["foo"], false)],
        );
        assert!(AlterTableOperations::build(&a, &b).is_empty());
    }

    #[test]
    fn a_uniqueness_change_produces_a_drop_and_an_add() {
        let a = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![index("foo_idx", &["foo"], false)],
        );
        let b = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![index("foo_idx", &["foo"], true)],
        );
        let ops = AlterTableOperations::build(&a, &b);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].up(), "drop_index foo, name: foo_idx");
        assert_eq!(ops[1].up(), "add_index foo, name: foo_idx, unique: true");
    }

    #[test]
    fn dropping_an_indexed_column_suppresses_the_index_drop() {
        let a = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![index("foo_idx", &["foo"], false)],
        );
        let b = table("example_table", vec![], vec![]);
        let ops = AlterTableOperations::build(&a, &b);
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].up(), "drop_column foo");
    }

    #[test]
    fn a_partially_dropped_index_still_needs_an_explicit_drop() {
        let a = table(
            "example_table",
            vec![
                column("foo", ColumnType::Integer),
                column("bar", ColumnType::Integer),
            ],
            vec![index("foo_bar_idx", &["foo", "bar"], false)],
        );
        let b = table(
            "example_table",
            vec![column("bar", ColumnType::Integer)],
            vec![],
        );
        let ops = AlterTableOperations::build(&a, &b);
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].up(), "drop_column foo");
        assert_eq!(
            ops[1].up(),
            "drop_index [foo, bar], name: foo_bar_idx"
        );
    }

    #[test]
    fn operations_are_grouped_columns_before_indexes() {
        let a = table(
            "example_table",
            vec![column("foo", ColumnType::Integer)],
            vec![],
        );
        let b = table(
            "example_table",
            vec![
                column("foo", ColumnType::Smallint),
                column("bar", ColumnType::Varchar),
            ],
            vec![index("bar_idx", &["bar"], false)],
        );
        let ops: Vec<String> = AlterTableOperations::build(&a, &b)
            .iter()
            .map(Operation::up)
            .collect();
        assert_eq!(
            ops,
            vec![
                "set_column_type foo, smallint, default: null",
                "add_column bar, varchar, null: false",
                "add_index bar, name: bar_idx",
            ]
        );
    }

    // Index mapping order comes from the definition source; make sure
    // build_from_mapping keeps it.
    #[test]
    fn index_order_follows_the_mapping() {
        let mut definitions = IndexMap::new();
        definitions.insert(
            "b_idx".to_string(),
            crate::schema::types::IndexSpec {
                columns: crate::schema::types::ColumnList::One("b".to_string()),
                unique: false,
            },
        );
        definitions.insert(
            "a_idx".to_string(),
            crate::schema::types::IndexSpec {
                columns: crate::schema::types::ColumnList::One("a".to_string()),
                unique: false,
            },
        );
        let indexes = Index::build_from_mapping(&definitions);
        assert_eq!(indexes[0].name, "b_idx");
        assert_eq!(indexes[1].name, "a_idx");
    }
}
