//! Error types for taskstore
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad arguments, invalid configuration)
//! - 3: Referenced task does not exist
//! - 4: Operation failed (storage, corruption, persistence, lock)
//!
//! `http_status` gives the transport mapping used by request-serving callers.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the taskstore CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for store operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Missing records (exit code 3)
    #[error("Task with id {0} not found")]
    NotFound(String),

    // Operation failures (exit code 4)
    #[error("Storage unavailable at {path}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Corrupt data in {path}: {reason}")]
    CorruptData { path: PathBuf, reason: String },

    #[error("Failed to persist {path}: {source}")]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Lock acquisition failed: {0}")]
    LockFailed(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidArgument(_) | Error::InvalidConfig(_) | Error::TomlParse(_) => {
                exit_codes::USER_ERROR
            }

            Error::NotFound(_) => exit_codes::NOT_FOUND,

            Error::StorageUnavailable { .. }
            | Error::CorruptData { .. }
            | Error::PersistenceFailure { .. }
            | Error::LockFailed(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlSerialize(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// HTTP status a request handler should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound(_) => 404,
            Error::InvalidArgument(_) => 400,
            _ => 500,
        }
    }

    /// Stable machine-readable identifier
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid_argument",
            Error::InvalidConfig(_) | Error::TomlParse(_) => "invalid_config",
            Error::NotFound(_) => "not_found",
            Error::StorageUnavailable { .. } => "storage_unavailable",
            Error::CorruptData { .. } => "corrupt_data",
            Error::PersistenceFailure { .. } => "persistence_failure",
            Error::LockFailed(_) => "lock_failed",
            Error::Io(_) | Error::Json(_) | Error::TomlSerialize(_) => "operation_failed",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Structured details for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::StorageUnavailable { path, .. }
            | Error::PersistenceFailure { path, .. }
            | Error::LockFailed(path) => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            Error::CorruptData { path, reason } => Some(serde_json::json!({
                "path": path.display().to_string(),
                "reason": reason,
            })),
            Error::InvalidArgument(message) | Error::InvalidConfig(message) => {
                Some(serde_json::json!({ "message": message }))
            }
            _ => None,
        }
    }
}

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;
