//! Core error types for clocktimer-core.
//!
//! The timer logic itself is infallible: selection returns `Option`, the
//! formatter returns `None` for negative input, and the state machine logs and
//! ignores events it cannot apply. Errors only arise at the edges (storage,
//! configuration, parsing user input).

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::TimerId;

/// Core error type for clocktimer-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timer store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// User input that could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Timer store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open database connection
    #[error("Failed to open timer store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another process
    #[error("Timer store is locked")]
    Locked,

    /// A stored row could not be decoded
    #[error("Timer {id} is corrupt: {message}")]
    Corrupt { id: TimerId, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown config key: {0}")]
    UnknownKey(String),

    /// The data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Errors from parsing user-supplied values.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// Not a recognizable duration such as `90s`, `5m` or `1h30m`
    #[error("Invalid duration '{input}': {message}")]
    InvalidDuration { input: String, message: String },

    /// Duration is zero or longer than the maximum timer length
    #[error("Duration '{input}' is out of range (must be between 1s and 100h)")]
    OutOfRange { input: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseLocked
                    || e.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_wraps_into_core_error() {
        let err: CoreError = StoreError::Locked.into();
        assert_eq!(err.to_string(), "Store error: Timer store is locked");
    }

    #[test]
    fn parse_error_message_names_input() {
        let err = ParseError::OutOfRange { input: "0s".into() };
        assert!(err.to_string().contains("'0s'"));
    }
}
