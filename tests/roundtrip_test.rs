//! End-to-end tests over a real database file: discovery, form synthesis,
//! insertion, and the memoized read path.

use std::collections::HashMap;
use std::time::Duration;

use tabula::data::DataReader;
use tabula::db::ConnectionFactory;
use tabula::form::synthesize_fields;
use tabula::insert::{insert_row, InsertError};
use tabula::metadata::{list_columns, list_tables};
use tabula::{CellValue, WidgetKind};

/// A temp database file so every connection from the factory sees the same
/// data (in-memory databases are per-connection).
fn fixture_db(schema: &str) -> (tempfile::TempDir, ConnectionFactory) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.db");
    let factory = ConnectionFactory::new(&path);
    factory.connect().unwrap().execute_batch(schema).unwrap();
    (dir, factory)
}

#[test]
fn explore_then_add_data_scenario() {
    let (_dir, factory) = fixture_db("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)");
    let conn = factory.connect().unwrap();

    // Discovery.
    assert_eq!(list_tables(&conn).unwrap(), vec!["users".to_string()]);

    let columns = list_columns(&conn, "users").unwrap();
    assert_eq!(columns.len(), 2);
    assert_eq!(columns[0].name, "id");
    assert_eq!(columns[0].decl_type, "INTEGER");
    assert_eq!(columns[0].pk, 1);
    assert_eq!(columns[1].name, "name");
    assert_eq!(columns[1].decl_type, "TEXT");
    assert_eq!(columns[1].pk, 0);

    // Form synthesis: integer field for id, text field for name.
    let fields = synthesize_fields(&columns);
    assert_eq!(fields[0].widget, WidgetKind::Integer);
    assert_eq!(fields[1].widget, WidgetKind::Text);

    // Submit {id: 3, name: "Ana"} as the UI would: raw strings parsed per
    // field, in synthesized order.
    let submitted: HashMap<&str, &str> = [("id", "3"), ("name", "Ana")].into();
    let values: Vec<(String, CellValue)> = fields
        .iter()
        .map(|f| (f.name.clone(), f.parse_input(submitted[f.name.as_str()]).unwrap()))
        .collect();

    insert_row(&conn, "users", &columns, &values).unwrap();

    // The inserted row comes back unchanged on a cache-bypassing read.
    let reader = DataReader::new(factory.clone(), Duration::from_secs(300));
    let data = reader.fetch_rows_uncached("users").unwrap();
    assert_eq!(data.columns, vec!["id".to_string(), "name".to_string()]);
    assert_eq!(
        data.rows,
        vec![vec![CellValue::Integer(3), CellValue::Text("Ana".to_string())]]
    );
}

#[test]
fn memoized_snapshot_lags_behind_an_insert() {
    let (_dir, factory) = fixture_db("CREATE TABLE notes (body TEXT)");
    let conn = factory.connect().unwrap();
    let reader = DataReader::new(factory.clone(), Duration::from_secs(300));

    // Prime the snapshot, then write behind its back.
    assert_eq!(reader.fetch_rows("notes").unwrap().row_count(), 0);

    let columns = list_columns(&conn, "notes").unwrap();
    insert_row(
        &conn,
        "notes",
        &columns,
        &[("body".to_string(), CellValue::Text("hi".to_string()))],
    )
    .unwrap();

    // Within the freshness window the stale snapshot is still served; a
    // bypass sees the new row and refreshes the snapshot.
    assert_eq!(reader.fetch_rows("notes").unwrap().row_count(), 0);
    assert_eq!(reader.fetch_rows_uncached("notes").unwrap().row_count(), 1);
    assert_eq!(reader.fetch_rows("notes").unwrap().row_count(), 1);
}

#[test]
fn zero_ttl_recomputes_every_read() {
    let (_dir, factory) = fixture_db("CREATE TABLE notes (body TEXT)");
    let conn = factory.connect().unwrap();
    let reader = DataReader::new(factory.clone(), Duration::ZERO);

    assert_eq!(reader.fetch_rows("notes").unwrap().row_count(), 0);

    let columns = list_columns(&conn, "notes").unwrap();
    insert_row(
        &conn,
        "notes",
        &columns,
        &[("body".to_string(), CellValue::Text("hi".to_string()))],
    )
    .unwrap();

    assert_eq!(reader.fetch_rows("notes").unwrap().row_count(), 1);
}

#[test]
fn wrong_type_into_strict_column_fails_and_data_view_survives() {
    let (_dir, factory) =
        fixture_db("CREATE TABLE measurements (id INTEGER, label TEXT) STRICT");
    let conn = factory.connect().unwrap();
    let reader = DataReader::new(factory.clone(), Duration::from_secs(300));

    assert_eq!(reader.fetch_rows("measurements").unwrap().row_count(), 0);

    let columns = list_columns(&conn, "measurements").unwrap();
    let err = insert_row(
        &conn,
        "measurements",
        &columns,
        &[("id".to_string(), CellValue::Text("not a number".to_string()))],
    )
    .unwrap_err();

    assert!(matches!(err, InsertError::Execute { .. }));
    assert!(err.to_string().contains("measurements"));

    // The prior (memoized) data view is unaffected by the failed write.
    assert_eq!(reader.fetch_rows("measurements").unwrap().row_count(), 0);
}

#[test]
fn fetch_preserves_mixed_value_types() {
    let (_dir, factory) = fixture_db(
        "CREATE TABLE samples (n INTEGER, x REAL, s TEXT, b BLOB);
         INSERT INTO samples VALUES (1, 0.5, 'one', x'ff00'), (NULL, NULL, NULL, NULL);",
    );
    let reader = DataReader::new(factory, Duration::from_secs(300));

    let data = reader.fetch_rows("samples").unwrap();
    assert_eq!(
        data.rows[0],
        vec![
            CellValue::Integer(1),
            CellValue::Real(0.5),
            CellValue::Text("one".to_string()),
            CellValue::Text("0xff00".to_string()),
        ]
    );
    assert_eq!(data.rows[1], vec![CellValue::Null; 4]);
}
