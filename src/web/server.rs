//! Axum web server for the Tabula UI.
//!
//! Serves the embedded UI and provides the JSON API for table discovery,
//! schema display, data display, and row insertion.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Settings;
use crate::data::{DataReader, TableData};
use crate::db::ConnectionFactory;
use crate::form::{synthesize_fields, FieldSpec};
use crate::insert::insert_row;
use crate::metadata::{ensure_known_table, list_columns, list_tables, ColumnInfo, MetadataError};

/// Embedded static files for the UI.
#[derive(RustEmbed)]
#[folder = "ui"]
struct Assets;

/// Application state shared across handlers.
pub struct AppState {
    /// Connection factory for the configured database.
    pub factory: ConnectionFactory,
    /// Memoizing data reader over the same database.
    pub reader: DataReader,
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/tables", get(get_tables))
        .route("/api/tables/{table}/columns", get(get_columns))
        .route("/api/tables/{table}/rows", get(get_rows).post(post_row))
        .route("/api/tables/{table}/form", get(get_form))
        // Static files (SPA fallback)
        .fallback(static_handler)
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn serve(settings: Settings, open_browser: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = settings.database.resolved_path()?;
    let factory = ConnectionFactory::new(&db_path);
    let reader = DataReader::new(factory.clone(), settings.cache.ttl());

    let state = Arc::new(AppState { factory, reader });
    let app = router(state);

    let addr = format!("127.0.0.1:{}", settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!("🗂  Tabula");
    println!("   URL: http://localhost:{}", settings.server.port);
    println!("   Database: {}", db_path);
    println!();
    println!("   Press Ctrl+C to stop");

    if open_browser {
        let _ = open::that(format!("http://localhost:{}", settings.server.port));
    }

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// API Handlers
// ============================================================================

#[derive(Serialize)]
struct TablesResponse {
    tables: Vec<String>,
}

/// Request to insert a row: raw strings keyed by column name, parsed
/// server-side against the column metadata fetched at submission time.
#[derive(Deserialize)]
struct InsertRequest {
    values: HashMap<String, String>,
}

/// Response for the insert operation.
#[derive(Serialize)]
struct InsertResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl InsertResponse {
    fn ok(message: String) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message),
            error: None,
        })
    }

    fn err(error: String) -> Json<Self> {
        Json(Self {
            success: false,
            message: None,
            error: Some(error),
        })
    }
}

/// Map a metadata failure to an API status. Empty results mean the table
/// (or any table at all) does not exist.
fn metadata_status(err: &MetadataError) -> StatusCode {
    match err {
        MetadataError::NoTables | MetadataError::NoColumns(_) => StatusCode::NOT_FOUND,
        MetadataError::Query { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn connect_error(e: rusqlite::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("error establishing database connection: {}", e),
    )
}

/// GET /api/tables - List user tables.
async fn get_tables(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TablesResponse>, (StatusCode, String)> {
    let conn = state.factory.connect().map_err(connect_error)?;

    list_tables(&conn)
        .map(|tables| Json(TablesResponse { tables }))
        .map_err(|e| (metadata_status(&e), e.to_string()))
}

/// GET /api/tables/:table/columns - Column descriptors for a table.
async fn get_columns(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<Vec<ColumnInfo>>, (StatusCode, String)> {
    let conn = state.factory.connect().map_err(connect_error)?;

    ensure_known_table(&conn, &table).map_err(|e| (metadata_status(&e), e.to_string()))?;

    list_columns(&conn, &table)
        .map(Json)
        .map_err(|e| (metadata_status(&e), e.to_string()))
}

/// GET /api/tables/:table/rows - Memoized table snapshot.
async fn get_rows(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<TableData>, (StatusCode, String)> {
    let conn = state.factory.connect().map_err(connect_error)?;

    ensure_known_table(&conn, &table).map_err(|e| (metadata_status(&e), e.to_string()))?;
    drop(conn);

    state
        .reader
        .fetch_rows(&table)
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// GET /api/tables/:table/form - Synthesized input fields for a table.
async fn get_form(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
) -> Result<Json<Vec<FieldSpec>>, (StatusCode, String)> {
    let conn = state.factory.connect().map_err(connect_error)?;

    ensure_known_table(&conn, &table).map_err(|e| (metadata_status(&e), e.to_string()))?;

    list_columns(&conn, &table)
        .map(|columns| Json(synthesize_fields(&columns)))
        .map_err(|e| (metadata_status(&e), e.to_string()))
}

/// POST /api/tables/:table/rows - Insert one row.
///
/// Column metadata is re-fetched here so the parsed fields always match
/// the current schema — a form submitted across a schema change fails on
/// its stale keys instead of inserting misparsed values.
async fn post_row(
    State(state): State<Arc<AppState>>,
    Path(table): Path<String>,
    Json(req): Json<InsertRequest>,
) -> Json<InsertResponse> {
    let conn = match state.factory.connect() {
        Ok(conn) => conn,
        Err(e) => {
            return InsertResponse::err(format!("error establishing database connection: {}", e))
        }
    };

    if let Err(e) = ensure_known_table(&conn, &table) {
        return InsertResponse::err(e.to_string());
    }

    let columns = match list_columns(&conn, &table) {
        Ok(columns) => columns,
        Err(e) => return InsertResponse::err(e.to_string()),
    };
    let fields = synthesize_fields(&columns);

    // Reject keys that match no current column before building any SQL.
    for key in req.values.keys() {
        if !fields.iter().any(|f| f.name.eq_ignore_ascii_case(key)) {
            return InsertResponse::err(format!(
                "column '{}' is not part of table '{}'",
                key, table
            ));
        }
    }

    // Parse in synthesized order; absent fields are simply not inserted.
    let mut values = Vec::with_capacity(fields.len());
    for field in &fields {
        if let Some(raw) = req.values.get(&field.name) {
            match field.parse_input(raw) {
                Ok(value) => values.push((field.name.clone(), value)),
                Err(e) => return InsertResponse::err(e.to_string()),
            }
        }
    }

    match insert_row(&conn, &table, &columns, &values) {
        Ok(()) => InsertResponse::ok(format!("New row added successfully to '{}'", table)),
        Err(e) => {
            tracing::warn!(table = %table, error = %e, "insert failed");
            InsertResponse::err(e.to_string())
        }
    }
}

// ============================================================================
// Static File Handler
// ============================================================================

/// Serve static files with SPA fallback.
async fn static_handler(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    let path = if path.is_empty() { "index.html" } else { path };

    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => match Assets::get("index.html") {
            Some(content) => (
                [(header::CONTENT_TYPE, "text/html")],
                content.data.into_owned(),
            )
                .into_response(),
            None => (StatusCode::NOT_FOUND, "Not found").into_response(),
        },
    }
}
