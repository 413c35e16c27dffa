//! Web server module for the Tabula UI.
//!
//! Provides the embedded browsing interface and the JSON API it calls.

mod server;

pub use server::*;
