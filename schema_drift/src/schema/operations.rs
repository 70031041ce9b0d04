//! Atomic schema-change operations
//!
//! Each operation carries enough information to render both its forward
//! (`up`) and inverse (`down`) statement. Operations are created fresh
//! per diff run and never persisted.

use crate::schema::types::{Column, Index};

/// Which aspect of a column a change operation rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Type,
    Default,
    Null,
}

/// A single schema change.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddColumn(Column),
    DropColumn(Column),
    ChangeColumn {
        from: Column,
        to: Column,
        kind: ChangeKind,
    },
    AddIndex(Index),
    DropIndex(Index),
}

impl Operation {
    /// Forward rendering: applies the desired definition.
    pub fn up(&self) -> String {
        match self {
            Operation::AddColumn(column) => column.add_statement(),
            Operation::DropColumn(column) => column.drop_statement(),
            Operation::ChangeColumn { to, kind, .. } => change_statement(to, *kind),
            Operation::AddIndex(index) => index.add_statement(),
            Operation::DropIndex(index) => index.drop_statement(),
        }
    }

    /// Inverse rendering: re-applies the existing definition.
    pub fn down(&self) -> String {
        match self {
            Operation::AddColumn(column) => column.drop_statement(),
            Operation::DropColumn(column) => column.add_statement(),
            Operation::ChangeColumn { from, kind, .. } => change_statement(from, *kind),
            Operation::AddIndex(index) => index.drop_statement(),
            Operation::DropIndex(index) => index.add_statement(),
        }
    }
}

fn change_statement(column: &Column, kind: ChangeKind) -> String {
    match kind {
        ChangeKind::Type => column.change_type_statement(),
        ChangeKind::Default => column.change_default_statement(),
        ChangeKind::Null => column.change_null_statement(),
    }
}
