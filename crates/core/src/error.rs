//! Error types for SmartStore
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Errors fall into four families:
//! - schema errors (`NoSuchSoup`, `NoSuchIndex`): the caller referenced a soup
//!   or path that was never registered
//! - input errors (`InvalidInput`, `InvalidPath`, `InvalidQuery`, `AmbiguousMatch`)
//! - corruption (`Corruption`): a stored document no longer parses
//! - backing-store failures (`StorageError`, `IoError`), passed through unchanged
//!
//! "Not found" is never an error: lookups return `Option` or `bool`.

use crate::json::PathParseError;
use std::io;
use thiserror::Error;

/// Result type alias for SmartStore operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed source error from the backing store
pub type BoxedSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for SmartStore
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (data directory, config file)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error outside stored documents
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Soup has not been registered
    #[error("No such soup: {0}")]
    NoSuchSoup(String),

    /// Path is not declared as an index on the soup
    #[error("No such index: soup '{soup}' has no index on path '{path}'")]
    NoSuchIndex {
        /// Soup being addressed
        soup: String,
        /// Path that failed to resolve
        path: String,
    },

    /// Malformed soup path
    #[error("Invalid path: {0}")]
    InvalidPath(#[from] PathParseError),

    /// Invalid argument (soup name, index specs, document shape)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Query keys that cannot be compared against the index column
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Upsert found more than one row for its external id
    #[error("Ambiguous match: {count} rows in soup '{soup}' match on path '{path}'")]
    AmbiguousMatch {
        /// Soup being addressed
        soup: String,
        /// External id path
        path: String,
        /// Number of matching rows
        count: usize,
    },

    /// Stored document failed to parse
    #[error("Data corruption in soup '{soup}' row {id}: {reason}")]
    Corruption {
        /// Soup holding the row
        soup: String,
        /// Surrogate id of the row
        id: i64,
        /// Parser message
        reason: String,
    },

    /// Backing store failure (I/O, constraint violation, busy database)
    #[error("Storage error: {0}")]
    StorageError(#[source] BoxedSource),

    /// Invalid or unreadable configuration
    #[error("Config error: {0}")]
    ConfigError(String),
}

impl Error {
    /// Wrap a backing-store error, keeping it as the error source.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::StorageError(Box::new(err))
    }

    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Shorthand for [`Error::InvalidQuery`].
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Error::InvalidQuery(msg.into())
    }

    /// True for errors caused by referencing an unregistered soup or path.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Error::NoSuchSoup(_) | Error::NoSuchIndex { .. })
    }

    /// True when the caller can fix the condition and retry
    /// (register the soup, fix the path or the arguments).
    ///
    /// Corruption and backing-store failures are not recoverable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::NoSuchSoup(_)
            | Error::NoSuchIndex { .. }
            | Error::InvalidPath(_)
            | Error::InvalidInput(_)
            | Error::InvalidQuery(_)
            | Error::AmbiguousMatch { .. } => true,
            Error::IoError(_)
            | Error::SerializationError(_)
            | Error::Corruption { .. }
            | Error::StorageError(_)
            | Error::ConfigError(_) => false,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
