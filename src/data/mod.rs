//! Data reader.
//!
//! Full-table row fetches, memoized per table name for a fixed freshness
//! window (default 300 s, see [`crate::config::CacheSettings`]). A stale
//! snapshot is recomputed transparently at read time; nothing invalidates
//! it earlier — in particular an insert does NOT invalidate the snapshot,
//! so a data view may lag a successful write by up to one window.

mod cache;

pub use cache::TtlCache;

use std::time::Duration;

use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::ToSql;
use serde::Serialize;

use crate::db::{quote_ident, ConnectionFactory};

/// Errors from row fetches.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("error fetching data for table '{table}': {source}")]
    Query {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// One cell of a fetched row.
///
/// Blobs are rendered as lowercase hex at fetch time; this tool displays
/// data, it does not round-trip binary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl CellValue {
    fn from_sql_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(bytes) => CellValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => {
                let mut hex = String::with_capacity(2 + bytes.len() * 2);
                hex.push_str("0x");
                for b in bytes {
                    hex.push_str(&format!("{:02x}", b));
                }
                CellValue::Text(hex)
            }
        }
    }
}

impl ToSql for CellValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            CellValue::Null => ToSqlOutput::Owned(Value::Null),
            CellValue::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            CellValue::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            CellValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// A full-table snapshot: column names plus rows in fetch order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TableData {
    /// Number of rows in the snapshot.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Memoizing reader for table contents.
///
/// Holds the connection factory and the process-wide snapshot cache. Each
/// miss opens its own short-lived connection and scans the whole table —
/// no pagination at this scale.
pub struct DataReader {
    factory: ConnectionFactory,
    cache: TtlCache<String, TableData>,
}

impl DataReader {
    /// Create a reader over the given factory with the given freshness
    /// window.
    pub fn new(factory: ConnectionFactory, ttl: Duration) -> Self {
        Self {
            factory,
            cache: TtlCache::new(ttl),
        }
    }

    /// Fetch all rows of a table, serving a memoized snapshot while it is
    /// fresh.
    ///
    /// The table name must come from previously discovered metadata; see
    /// [`crate::metadata::ensure_known_table`].
    pub fn fetch_rows(&self, table: &str) -> Result<TableData, DataError> {
        if let Some(snapshot) = self.cache.get(table) {
            tracing::debug!(table, "serving memoized snapshot");
            return Ok(snapshot);
        }

        self.fetch_rows_uncached(table)
    }

    /// Fetch all rows of a table, bypassing and refreshing the memo cache.
    pub fn fetch_rows_uncached(&self, table: &str) -> Result<TableData, DataError> {
        let wrap = |source| DataError::Query {
            table: table.to_string(),
            source,
        };

        let conn = self.factory.connect().map_err(wrap)?;
        let sql = format!("SELECT * FROM {}", quote_ident(table));
        let mut stmt = conn.prepare(&sql).map_err(wrap)?;

        let columns: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut result = stmt.query([]).map_err(wrap)?;
        while let Some(row) = result.next().map_err(wrap)? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                cells.push(CellValue::from_sql_ref(row.get_ref(i).map_err(wrap)?));
            }
            rows.push(cells);
        }

        let data = TableData { columns, rows };
        self.cache.insert(table.to_string(), data.clone());
        Ok(data)
    }

    /// Drop all memoized snapshots.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_serializes_untagged() {
        let row = vec![
            CellValue::Null,
            CellValue::Integer(3),
            CellValue::Real(0.5),
            CellValue::Text("Ana".to_string()),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"[null,3,0.5,"Ana"]"#);
    }

    #[test]
    fn test_blob_renders_as_hex() {
        let cell = CellValue::from_sql_ref(ValueRef::Blob(&[0xde, 0xad, 0x01]));
        assert_eq!(cell, CellValue::Text("0xdead01".to_string()));
    }
}
