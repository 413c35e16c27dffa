//! Configuration module for Tabula.
//!
//! Handles the config file, environment variable expansion, and defaults.

mod settings;

pub use settings::{
    expand_env_vars, CacheSettings, DatabaseSettings, ServerSettings, Settings, SettingsError,
};
