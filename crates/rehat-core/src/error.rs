//! Error types for rehat-core.
//!
//! Scheduler operations never surface these to the user: they are logged and
//! the session degrades to "no alarm / no sound / zero stats". One-shot CLI
//! commands print them and exit non-zero.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("state store: {0}")]
    Store(#[from] StoreError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

/// Failures of the persisted key-value state.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot open state database {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("state query failed: {0}")]
    QueryFailed(String),

    /// Another process holds the database.
    #[error("state database is busy")]
    Locked,

    /// The value under `key` is not what that key should hold.
    #[error("stored '{key}' is unreadable: {message}")]
    Corrupt { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    #[error("cannot write {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    #[error("bad value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The dot-path does not name a leaf setting.
    #[error("no such setting: {0}")]
    UnknownKey(String),

    #[error("config.toml is malformed: {0}")]
    ParseFailed(String),
}

/// Malformed user input, rejected before it reaches the scheduler.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        let busy = matches!(
            &err,
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(e.code, rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy)
        );
        if busy {
            StoreError::Locked
        } else {
            StoreError::QueryFailed(err.to_string())
        }
    }
}

pub type Result<T, E = CoreError> = std::result::Result<T, E>;
