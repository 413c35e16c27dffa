//! Tabula CLI - Browse a SQLite database from the web or the terminal
//!
//! Usage:
//!   tabula serve [--db <file>] [--port <port>] [--open]
//!   tabula tables [--db <file>]
//!   tabula schema <table> [--db <file>]
//!
//! Examples:
//!   tabula serve --db ./library.db --open
//!   tabula tables --db ./library.db
//!   tabula schema books --db ./library.db

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use tabula::config::Settings;
use tabula::db::ConnectionFactory;
use tabula::metadata::{list_columns, list_tables};
use tabula::{logging, web};

#[derive(Parser)]
#[command(name = "tabula")]
#[command(about = "Tabula - A lightweight web explorer for SQLite databases")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ./tabula.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database file (overrides the config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web UI
    Serve {
        /// Port to listen on (overrides the config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the browser after starting
        #[arg(long)]
        open: bool,
    },

    /// List tables in the database
    Tables,

    /// Show the schema of a table
    Schema {
        /// Table name
        table: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let cli = Cli::parse();

    let mut settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(db) = &cli.db {
        settings.database.path = db.display().to_string();
    }

    match cli.command {
        Commands::Serve { port, open } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            match web::serve(settings, open).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("Server error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Tables => cmd_tables(&settings),
        Commands::Schema { table } => cmd_schema(&settings, &table),
    }
}

fn load_settings(config: Option<&std::path::Path>) -> Result<Settings, tabula::config::SettingsError> {
    match config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    }
}

fn connect(settings: &Settings) -> Result<(String, rusqlite::Connection), ExitCode> {
    let path = match settings.database.resolved_path() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error resolving database path: {}", e);
            return Err(ExitCode::FAILURE);
        }
    };
    match ConnectionFactory::new(&path).connect() {
        Ok(conn) => Ok((path, conn)),
        Err(e) => {
            eprintln!("Error opening database '{}': {}", path, e);
            Err(ExitCode::FAILURE)
        }
    }
}

fn cmd_tables(settings: &Settings) -> ExitCode {
    let (path, conn) = match connect(settings) {
        Ok(v) => v,
        Err(code) => return code,
    };

    match list_tables(&conn) {
        Ok(tables) => {
            println!("Database: {}", path);
            println!();
            println!("Tables:");
            for table in tables {
                println!("  - {}", table);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_schema(settings: &Settings, table: &str) -> ExitCode {
    let (_, conn) = match connect(settings) {
        Ok(v) => v,
        Err(code) => return code,
    };

    match list_columns(&conn, table) {
        Ok(columns) => {
            println!("Schema for '{}':", table);
            println!();
            for col in columns {
                let mut flags = Vec::new();
                if col.is_primary_key() {
                    flags.push("pk".to_string());
                }
                if col.not_null {
                    flags.push("not null".to_string());
                }
                if let Some(default) = &col.default_value {
                    flags.push(format!("default {}", default));
                }
                let suffix = if flags.is_empty() {
                    String::new()
                } else {
                    format!("  [{}]", flags.join(", "))
                };
                let decl = if col.decl_type.is_empty() {
                    "(untyped)"
                } else {
                    &col.decl_type
                };
                println!("  {:2}  {}  {}{}", col.cid, col.name, decl, suffix);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
