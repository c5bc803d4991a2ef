//! Error types and Result aliases for termlaunch

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for termlaunch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for termlaunch
#[derive(Debug, Error)]
pub enum Error {
    // === Configuration errors ===
    /// A configuration file could not be read or decoded
    #[error("Failed to parse config '{}': {reason}", path.display())]
    ConfigParse { path: PathBuf, reason: String },

    /// A configuration file already exists where one would be written
    #[error("Configuration file '{}' already exists", path.display())]
    ConfigExists { path: PathBuf },

    /// Failed to set up the configuration file watcher
    #[error("Failed to watch for configuration files: {reason}")]
    WatchFailed { reason: String },

    /// Application settings could not be loaded or failed validation
    #[error("Failed to load settings from '{}': {reason}", path.display())]
    SettingsLoad { path: PathBuf, reason: String },

    // === Launch errors ===
    /// No workspace root or base path exists at all
    #[error("No workspace folder is open")]
    NoWorkspace,

    /// A relative `cwd` or `script` had nothing to resolve against
    #[error("Cannot resolve relative path '{path}': no base path or workspace root")]
    PathResolution { path: String },

    /// The host failed to allocate a session
    #[error("Failed to create session '{name}': {reason}")]
    SessionCreation { name: String, reason: String },

    /// Any other host operation failed (listing, disposal, text injection)
    #[error("Host operation '{operation}' failed: {reason}")]
    Host { operation: String, reason: String },

    // === I/O and serialization errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    /// Shorthand for a failed host operation
    pub fn host(operation: impl Into<String>, reason: impl ToString) -> Self {
        Error::Host {
            operation: operation.into(),
            reason: reason.to_string(),
        }
    }
}
