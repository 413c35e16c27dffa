//! Metadata reader.
//!
//! Catalog introspection against SQLite: table discovery via
//! `sqlite_master` and column metadata via `PRAGMA table_info`. These two
//! queries are the explicit, non-portable wire contract to the storage
//! engine — any other engine would need equivalent primitives.
//!
//! Both readers treat a structurally valid but empty result as an error
//! ([`MetadataError::NoTables`] / [`MetadataError::NoColumns`]) rather than
//! an empty-but-valid state: an empty pragma result means the table does
//! not exist, and callers must never see a valid-looking empty descriptor
//! list.

mod reader;

pub use reader::{ensure_known_table, list_columns, list_tables, LIST_TABLES_SQL};

use serde::{Deserialize, Serialize};

/// Errors from catalog introspection.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("error fetching {context}: {source}")]
    Query {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("no tables found in the database")]
    NoTables,

    #[error("no columns found for table '{0}'")]
    NoColumns(String),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

/// One column of a table, as reported by `PRAGMA table_info`.
///
/// A read-only snapshot: fetched per request, never cached across a
/// submission boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Ordinal position within the table.
    pub cid: i64,
    /// Column name, unique within the table.
    pub name: String,
    /// Declared type as written in the schema (free-form, may be empty).
    pub decl_type: String,
    /// Whether NOT NULL is set.
    pub not_null: bool,
    /// Default value expression, if any.
    pub default_value: Option<String>,
    /// Position within the primary key (0 = not part of the key).
    pub pk: i64,
}

impl ColumnInfo {
    /// Whether this column is part of the primary key.
    pub fn is_primary_key(&self) -> bool {
        self.pk > 0
    }
}
