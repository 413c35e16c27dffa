//! Row inserter.
//!
//! Builds and executes a parameterized `INSERT`. The column list is exactly
//! the submitted pairs in synthesized order; values are bound as named
//! parameters, never interpolated into SQL text. Identifiers cannot be
//! bound, so every submitted column name is allow-listed against the
//! just-fetched descriptor list before it is quoted into the statement.
//!
//! Single round trip: no retry, no partial-commit recovery, and no cache
//! invalidation on success — the data reader's snapshot catches up when
//! its freshness window lapses.

use rusqlite::{Connection, ToSql};

use crate::data::CellValue;
use crate::db::quote_ident;
use crate::metadata::ColumnInfo;

/// Errors from row insertion.
#[derive(Debug, thiserror::Error)]
pub enum InsertError {
    #[error("column '{column}' is not part of table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("no values submitted for table '{0}'")]
    NoValues(String),

    #[error("error inserting row into '{table}': {source}")]
    Execute {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
}

/// Build the `INSERT` statement text for the given column names.
///
/// Parameters are named `:v0..:vN` by position; the caller binds them in
/// the same order. Split out from [`insert_row`] so statement construction
/// is testable without a connection.
pub fn build_insert_sql(table: &str, column_names: &[&str]) -> String {
    let columns: Vec<String> = column_names.iter().map(|n| quote_ident(n)).collect();
    let placeholders: Vec<String> = (0..column_names.len()).map(|i| format!(":v{}", i)).collect();

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Insert one row into `table`.
///
/// `columns` must be the descriptor list fetched for this table at
/// submission time; every submitted name is checked against it. `values`
/// are `(column, value)` pairs in the order the form synthesized them.
pub fn insert_row(
    conn: &Connection,
    table: &str,
    columns: &[ColumnInfo],
    values: &[(String, CellValue)],
) -> Result<(), InsertError> {
    if values.is_empty() {
        return Err(InsertError::NoValues(table.to_string()));
    }

    for (name, _) in values {
        if !columns.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(InsertError::UnknownColumn {
                table: table.to_string(),
                column: name.clone(),
            });
        }
    }

    let names: Vec<&str> = values.iter().map(|(n, _)| n.as_str()).collect();
    let sql = build_insert_sql(table, &names);

    let param_names: Vec<String> = (0..values.len()).map(|i| format!(":v{}", i)).collect();
    let params: Vec<(&str, &dyn ToSql)> = param_names
        .iter()
        .zip(values.iter())
        .map(|(name, (_, value))| (name.as_str(), value as &dyn ToSql))
        .collect();

    conn.execute(&sql, &params[..])
        .map_err(|source| InsertError::Execute {
            table: table.to_string(),
            source,
        })?;

    tracing::info!(table, columns = values.len(), "inserted row");
    Ok(())
}
