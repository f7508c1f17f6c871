//! Store Error Types
//!
//! This module defines error types for document store operations, covering
//! connection, initialization, query and (de)serialization failures.

use std::path::PathBuf;
use thiserror::Error;

/// Document store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the database
    #[error("Failed to connect to database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Permission denied when accessing the database location
    #[error("Permission denied for database path: {path}")]
    PermissionDenied { path: PathBuf },

    /// Failed to create parent directory
    #[error("Failed to create parent directory for database: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    /// libsql operation error
    #[error("Database operation failed: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// SQL execution error with context
    #[error("SQL execution failed: {context}")]
    SqlExecutionError { context: String },

    /// A stored or outgoing document could not be (de)serialized
    #[error("Document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// In-memory store lock was poisoned by a panicking writer
    #[error("Failed to acquire store lock")]
    LockPoisoned,

    /// Insert collided with an existing document of the same name
    #[error("Document '{name}' already exists")]
    DuplicateName { name: String },
}

impl StoreError {
    /// Create a connection failed error
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    /// Create a permission denied error
    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    /// Create a SQL execution error with context
    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    pub fn duplicate_name(name: impl Into<String>) -> Self {
        Self::DuplicateName { name: name.into() }
    }
}
