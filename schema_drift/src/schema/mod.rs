//! Schema model, diffing, and migration generation.

pub mod diff;
pub mod generator;
pub mod loader;
pub mod operations;
pub mod parser;
pub mod types;

// Re-export key types
pub use diff::AlterTableOperations;
pub use generator::{Migration, MigrationBuilder};
pub use operations::{ChangeKind, Operation};
pub use parser::{RawColumn, RawTable, Tables};
pub use types::{
    Column, ColumnAttr, ColumnList, ColumnType, Index, IndexSpec, PrimaryKey, Size, Table, Value,
};
