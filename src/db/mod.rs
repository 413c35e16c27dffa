//! Database connection provider.
//!
//! A [`ConnectionFactory`] is the single configuration-derived handle to the
//! target database. It is constructed once (from [`crate::config::Settings`]
//! or an explicit path) and passed to every component that talks to SQLite.
//! Each operation opens its own short-lived [`Connection`] and drops it when
//! the call returns; there is no pooling and no shared transaction.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::config::Settings;

/// Factory for short-lived SQLite connections to one database file.
#[derive(Debug, Clone)]
pub struct ConnectionFactory {
    path: PathBuf,
}

impl ConnectionFactory {
    /// Create a factory for the given database file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a factory from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.database.path)
    }

    /// Open a fresh connection to the configured database.
    pub fn connect(&self) -> rusqlite::Result<Connection> {
        Connection::open(&self.path)
    }

    /// Path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Quote an identifier for direct inclusion in SQL text.
///
/// Identifiers (table and column names) cannot be bound as parameters, so
/// they are double-quoted with embedded quotes doubled. Callers must still
/// allow-list the name against just-fetched metadata before using it.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident_plain() {
        assert_eq!(quote_ident("users"), "\"users\"");
    }

    #[test]
    fn test_quote_ident_embedded_quote() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_factory_connect_in_memory() {
        let factory = ConnectionFactory::new(":memory:");
        let conn = factory.connect().unwrap();
        conn.execute_batch("CREATE TABLE t (x INTEGER)").unwrap();
    }
}
