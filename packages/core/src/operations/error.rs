//! Error types for tree mutations
//!
//! These errors are detected locally, before anything reaches the store, and are
//! shared by the client and server runs of the same algorithms.

use thiserror::Error;

/// Errors that can occur while mutating a tree
///
/// # Examples
///
/// ```rust
/// use treesync_core::operations::MutationError;
///
/// let err = MutationError::name_taken("root-c1");
/// assert_eq!(err.to_string(), "Name 'root-c1' is already used in the tree");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MutationError {
    /// No node carries the requested parent name
    #[error("Parent node '{parent_name}' not found")]
    ParentNotFound { parent_name: String },

    /// No node carries the requested target name
    #[error("Node '{name}' not found")]
    NodeNotFound { name: String },

    /// A rename would duplicate a name already present somewhere in the tree.
    ///
    /// The whole update is rejected; none of its fields are applied.
    #[error("Name '{name}' is already used in the tree")]
    NameTaken { name: String },
}

impl MutationError {
    pub fn parent_not_found(parent_name: impl Into<String>) -> Self {
        Self::ParentNotFound {
            parent_name: parent_name.into(),
        }
    }

    pub fn node_not_found(name: impl Into<String>) -> Self {
        Self::NodeNotFound { name: name.into() }
    }

    pub fn name_taken(name: impl Into<String>) -> Self {
        Self::NameTaken { name: name.into() }
    }

    /// True for the two "nothing matched" variants
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ParentNotFound { .. } | Self::NodeNotFound { .. }
        )
    }
}
