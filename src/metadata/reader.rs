//! Catalog queries against a live connection.

use rusqlite::Connection;

use super::{ColumnInfo, MetadataError, MetadataResult};
use crate::db::quote_ident;

/// Catalog query for user tables. Internal `sqlite_*` tables are excluded.
pub const LIST_TABLES_SQL: &str =
    "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name";

/// List the names of all user tables in the database.
///
/// Fails with [`MetadataError::NoTables`] if the database contains no
/// tables at all.
pub fn list_tables(conn: &Connection) -> MetadataResult<Vec<String>> {
    let query = |conn: &Connection| -> rusqlite::Result<Vec<String>> {
        let mut stmt = conn.prepare(LIST_TABLES_SQL)?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    };

    let names = query(conn).map_err(|source| MetadataError::Query {
        context: "table list".to_string(),
        source,
    })?;

    if names.is_empty() {
        return Err(MetadataError::NoTables);
    }

    Ok(names)
}

/// Fetch column descriptors for a table via `PRAGMA table_info`.
///
/// The pragma returns zero rows for a table that does not exist; that case
/// is reported as [`MetadataError::NoColumns`], never as a silent empty
/// list.
pub fn list_columns(conn: &Connection, table: &str) -> MetadataResult<Vec<ColumnInfo>> {
    let query = |conn: &Connection| -> rusqlite::Result<Vec<ColumnInfo>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        let mut stmt = conn.prepare(&sql)?;
        let columns = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    // Typeless columns report NULL here.
                    decl_type: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    not_null: row.get(3)?,
                    default_value: row.get(4)?,
                    pk: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    };

    let columns = query(conn).map_err(|source| MetadataError::Query {
        context: format!("columns for table '{}'", table),
        source,
    })?;

    if columns.is_empty() {
        return Err(MetadataError::NoColumns(table.to_string()));
    }

    Ok(columns)
}

/// Allow-list a table name against the just-fetched catalog.
///
/// Boundary check for names that arrive from outside (URL paths, CLI
/// arguments) before they are quoted into query text. SQLite identifiers
/// compare case-insensitively.
pub fn ensure_known_table(conn: &Connection, table: &str) -> MetadataResult<()> {
    let tables = list_tables(conn)?;
    if tables.iter().any(|t| t.eq_ignore_ascii_case(table)) {
        Ok(())
    } else {
        Err(MetadataError::NoColumns(table.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_fixture() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (
                 id INTEGER PRIMARY KEY,
                 name TEXT NOT NULL,
                 score REAL DEFAULT 0.5
             );
             CREATE TABLE tags (label VARCHAR(40));",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_list_tables_sorted_unique() {
        let conn = open_fixture();
        let tables = list_tables(&conn).unwrap();
        assert_eq!(tables, vec!["tags".to_string(), "users".to_string()]);
    }

    #[test]
    fn test_list_tables_empty_database() {
        let conn = Connection::open_in_memory().unwrap();
        let err = list_tables(&conn).unwrap_err();
        assert!(matches!(err, MetadataError::NoTables));
    }

    #[test]
    fn test_list_tables_excludes_internal() {
        let conn = open_fixture();
        // An AUTOINCREMENT table forces sqlite_sequence into existence.
        conn.execute_batch("CREATE TABLE seq (id INTEGER PRIMARY KEY AUTOINCREMENT)")
            .unwrap();
        conn.execute("INSERT INTO seq DEFAULT VALUES", []).unwrap();

        let tables = list_tables(&conn).unwrap();
        assert!(!tables.iter().any(|t| t.starts_with("sqlite_")));
        assert!(tables.contains(&"seq".to_string()));
    }

    #[test]
    fn test_list_columns_descriptors() {
        let conn = open_fixture();
        let columns = list_columns(&conn, "users").unwrap();

        assert_eq!(columns.len(), 3);

        assert_eq!(columns[0].name, "id");
        assert_eq!(columns[0].decl_type, "INTEGER");
        assert_eq!(columns[0].pk, 1);
        assert!(columns[0].is_primary_key());

        assert_eq!(columns[1].name, "name");
        assert_eq!(columns[1].decl_type, "TEXT");
        assert!(columns[1].not_null);
        assert!(!columns[1].is_primary_key());

        assert_eq!(columns[2].name, "score");
        assert_eq!(columns[2].default_value.as_deref(), Some("0.5"));
    }

    #[test]
    fn test_list_columns_nonexistent_table() {
        let conn = open_fixture();
        let err = list_columns(&conn, "no_such_table").unwrap_err();
        assert!(matches!(err, MetadataError::NoColumns(t) if t == "no_such_table"));
    }

    #[test]
    fn test_list_columns_hostile_name_is_contained() {
        let conn = open_fixture();
        // A quoted hostile name never escapes the pragma argument.
        let err = list_columns(&conn, "users\"); DROP TABLE users; --").unwrap_err();
        assert!(matches!(err, MetadataError::NoColumns(_)));
        assert!(list_columns(&conn, "users").is_ok());
    }

    #[test]
    fn test_ensure_known_table() {
        let conn = open_fixture();
        assert!(ensure_known_table(&conn, "users").is_ok());
        assert!(ensure_known_table(&conn, "USERS").is_ok());
        assert!(ensure_known_table(&conn, "missing").is_err());
    }
}
