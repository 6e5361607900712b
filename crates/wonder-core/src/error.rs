//! Core error types for wonder-core.
//!
//! The persistence facade is fail-soft toward its callers (defaults and
//! booleans, never errors), so these types live at the collaborator seams:
//! key-value store implementations, the notification gateway, configuration
//! loading, and input validation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wonder-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Notification-related errors
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by key-value store implementations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the backing store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Read failed
    #[error("Read failed for '{key}': {message}")]
    ReadFailed { key: String, message: String },

    /// Write failed
    #[error("Write failed for '{key}': {message}")]
    WriteFailed { key: String, message: String },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The store cannot serve requests at all
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by the notification gateway.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// The user (or configuration) denied notification permission
    #[error("Notification permission denied")]
    PermissionDenied,

    /// Arming a notification failed
    #[error("Scheduling failed: {0}")]
    ScheduleFailed(String),

    /// The pending-notification ledger could not be read or written
    #[error("Ledger unavailable: {0}")]
    LedgerUnavailable(String),
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Text outside the allowed length range
    #[error("Text length {len} outside allowed range {min}..={max}")]
    TextLength { len: usize, min: usize, max: usize },

    /// Unknown journey identifier
    #[error("Unknown journey '{0}'")]
    UnknownJourney(String),

    /// Hour/minute out of range
    #[error("Invalid time {hour:02}:{minute:02}")]
    InvalidTime { hour: u32, minute: u32 },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
