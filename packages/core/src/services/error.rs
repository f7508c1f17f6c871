//! Service Layer Error Types
//!
//! Errors raised by the persistence service while reading or mutating the stored
//! tree. The HTTP layer maps each variant to a status code and a caller-facing
//! message.

use crate::db::StoreError;
use thiserror::Error;

/// Persistence service errors
#[derive(Error, Debug)]
pub enum TreeServiceError {
    /// No stored document carries the requested root name
    #[error("Tree not found: {name}")]
    TreeNotFound { name: String },

    /// The tree exists but no node carries the requested parent name
    #[error("Parent node not found: {parent_name}")]
    ParentNotFound { parent_name: String },

    /// A write was issued but the store reports nothing changed
    #[error("Tree '{name}' was not modified")]
    NotModified { name: String },

    /// An upsert neither matched nor inserted a document
    #[error("No document matched or was inserted for tree '{name}'")]
    NoMatch { name: String },

    /// Underlying store call failed
    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

impl TreeServiceError {
    pub fn tree_not_found(name: impl Into<String>) -> Self {
        Self::TreeNotFound { name: name.into() }
    }

    pub fn parent_not_found(parent_name: impl Into<String>) -> Self {
        Self::ParentNotFound {
            parent_name: parent_name.into(),
        }
    }

    pub fn not_modified(name: impl Into<String>) -> Self {
        Self::NotModified { name: name.into() }
    }

    pub fn no_match(name: impl Into<String>) -> Self {
        Self::NoMatch { name: name.into() }
    }
}
