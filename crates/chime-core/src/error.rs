//! Core error types for chime-core.
//!
//! This module defines the error hierarchy using thiserror. Collaborator
//! failures (sound, notifications, history) surface as failed futures and
//! are only ever seen by whoever awaited that particular piece of work.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for chime-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// History storage errors
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    /// An external collaborator (sound device, notifier, page host) failed
    #[error("{collaborator} failed: {message}")]
    Collaborator {
        collaborator: &'static str,
        message: String,
    },

    /// `exclusive` was called from inside a task already running under the same mutex
    #[error("Reentrant call into an async mutex from its own critical section")]
    Reentrant,

    /// The mutex worker is gone and can no longer accept tasks
    #[error("Async mutex worker has shut down")]
    MutexClosed,

    /// A task panicked while running under the mutex
    #[error("Task panicked inside critical section: {0}")]
    TaskPanicked(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

impl CoreError {
    /// Shorthand for a failed collaborator call.
    pub fn collaborator(collaborator: &'static str, message: impl Into<String>) -> Self {
        CoreError::Collaborator {
            collaborator,
            message: message.into(),
        }
    }
}

/// History-store errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Failed to open the history database
    #[error("Failed to open history at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("History database is locked")]
    Locked,

    /// The blocking worker running the query was lost
    #[error("History worker failed: {0}")]
    WorkerFailed(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to locate or create the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),

    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for HistoryError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    HistoryError::Locked
                } else {
                    HistoryError::QueryFailed(err.to_string())
                }
            }
            _ => HistoryError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::History(err.into())
    }
}

impl From<tokio::task::JoinError> for CoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            CoreError::TaskPanicked(panic_message(err.into_panic()))
        } else {
            CoreError::MutexClosed
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
