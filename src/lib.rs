//! # Tabula
//!
//! A lightweight web explorer for SQLite databases: list the tables in a
//! database file, display their schema and contents, and insert new rows
//! through a form generated from the table's column metadata.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  Web UI / CLI                            │
//! │  (Explore Database, Add Data, terminal inspection)       │
//! └─────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼ [read path]                  ▼ [write path]
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │ metadata + data readers  │   │ form synthesizer         │
//! │ (sqlite_master, PRAGMA,  │   │ (typed widgets from      │
//! │  TTL-memoized row fetch) │   │  declared column types)  │
//! └──────────────────────────┘   └──────────────────────────┘
//!            │                              │
//!            ▼                              ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │          db::ConnectionFactory + row inserter            │
//! │     (short-lived connections, parameterized INSERT)      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Every component takes the connection factory explicitly; there is no
//! global engine handle.

pub mod config;
pub mod data;
pub mod db;
pub mod form;
pub mod insert;
pub mod logging;
pub mod metadata;
pub mod web;

// Re-exports for convenient usage from the binary and tests.
pub use config::Settings;
pub use data::{CellValue, DataReader, TableData};
pub use db::ConnectionFactory;
pub use form::{synthesize_fields, FieldSpec, WidgetKind};
pub use metadata::{list_columns, list_tables, ColumnInfo};
