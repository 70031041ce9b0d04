//! Live schema introspection
//!
//! Reads the current table structure once, up front. Everything after
//! this point is pure computation over the snapshot; no further I/O is
//! interleaved with diffing.

use indexmap::IndexMap;
use sqlx::mysql::MySqlPool;
use sqlx::FromRow;
use tracing::debug;

use crate::error::Result;
use crate::schema::parser::{self, RawColumn, RawTable, Tables};
use crate::schema::types::{ColumnList, IndexSpec};

#[derive(FromRow)]
struct ColumnRow {
    table_name: String,
    column_name: String,
    column_type: String,
    is_nullable: String,
    column_default: Option<String>,
    column_key: String,
}

#[derive(FromRow)]
struct IndexRow {
    table_name: String,
    index_name: String,
    column_name: String,
    non_unique: i64,
}

/// Reads and parses the full schema of the connected database.
pub async fn snapshot(pool: &MySqlPool) -> Result<Tables> {
    let columns = sqlx::query_as::<_, ColumnRow>(
        r#"
        SELECT table_name, column_name, column_type, is_nullable,
               column_default, column_key
        FROM information_schema.columns
        WHERE table_schema = DATABASE()
        ORDER BY table_name, ordinal_position
        "#,
    )
    .fetch_all(pool)
    .await?;

    let indexes = sqlx::query_as::<_, IndexRow>(
        r#"
        SELECT table_name, index_name, column_name, non_unique
        FROM information_schema.statistics
        WHERE table_schema = DATABASE() AND index_name <> 'PRIMARY'
        ORDER BY table_name, index_name, seq_in_index
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut raw: IndexMap<String, RawTable> = IndexMap::new();
    for row in columns {
        raw.entry(row.table_name).or_default().columns.push(RawColumn {
            name: row.column_name,
            db_type: row.column_type,
            allow_null: row.is_nullable == "YES",
            default: row.column_default,
            primary_key: row.column_key == "PRI",
        });
    }
    for row in indexes {
        let table = raw.entry(row.table_name).or_default();
        let spec = table
            .indexes
            .entry(row.index_name)
            .or_insert_with(|| IndexSpec {
                columns: ColumnList::Many(Vec::new()),
                unique: row.non_unique == 0,
            });
        if let ColumnList::Many(columns) = &mut spec.columns {
            columns.push(row.column_name);
        }
    }

    debug!(tables = raw.len(), "introspected live schema");
    parser::parse_tables(raw)
}
