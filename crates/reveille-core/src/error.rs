//! Core error types for reveille-core.
//!
//! Failures in this crate degrade silently by policy: stores log and keep
//! their in-memory state authoritative rather than surfacing errors to the
//! user. The types here exist for the storage and scheduler boundaries,
//! where callers may still want the cause.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for reveille-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    #[error("{0}")]
    Custom(String),
}

/// Key-value persistence errors.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to load '{key}' from {path}: {message}")]
    LoadFailed {
        key: String,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to save '{key}' to {path}: {message}")]
    SaveFailed {
        key: String,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to parse '{key}': {message}")]
    ParseFailed { key: String, message: String },

    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// External notification scheduler errors.
///
/// A rejection never rolls back in-memory state; the affected alarm or
/// timer simply has no registered trigger until the next reschedule.
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Notification permission not granted")]
    PermissionDenied,

    #[error("Trigger rejected: {0}")]
    Rejected(String),
}

/// Result type alias for CoreError.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
