//! TreeStore Trait - Document Store Abstraction
//!
//! Abstracts the keyspace of tree documents so the persistence service does not
//! depend on a particular backend.
//!
//! # Semantics
//!
//! - One document per tree, keyed by the root node's `name`
//! - Writes are whole-document: `replace` and `upsert` overwrite the stored tree
//! - Results report matched/modified/upserted counts, so callers can tell a no-op
//!   write from a real change
//! - No transactions and no concurrency token: a read followed by a write may race
//!   with another writer
//!
//! # Examples
//!
//! ```rust,no_run
//! use treesync_core::db::{InMemoryTreeStore, TreeStore};
//! use treesync_core::models::TreeNode;
//!
//! # async fn example() -> Result<(), treesync_core::db::StoreError> {
//! let store = InMemoryTreeStore::new();
//! store.insert(TreeNode::root()).await?;
//!
//! let root = store.find_by_name("root").await?;
//! assert!(root.is_some());
//! # Ok(())
//! # }
//! ```

use crate::db::StoreError;
use crate::models::{TreeDocument, TreeNode};
use async_trait::async_trait;

/// Outcome of a replace-by-name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaceResult {
    /// Documents whose name matched the filter
    pub matched: u64,
    /// Documents whose content actually changed
    pub modified: u64,
}

/// Outcome of an upsert-by-name
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertResult {
    pub matched: u64,
    pub modified: u64,
    /// Documents inserted because nothing matched
    pub upserted: u64,
}

impl UpsertResult {
    /// True when the write neither matched nor inserted anything
    pub fn is_noop(&self) -> bool {
        self.matched == 0 && self.upserted == 0
    }
}

/// Abstraction layer for tree document persistence
///
/// Implementations must be `Send + Sync` so a single instance can be shared across
/// request handlers.
#[async_trait]
pub trait TreeStore: Send + Sync {
    /// Every stored document, in insertion order
    async fn find_all(&self) -> Result<Vec<TreeDocument>, StoreError>;

    /// The tree whose root is named `name`, without its store identifier
    async fn find_by_name(&self, name: &str) -> Result<Option<TreeNode>, StoreError>;

    /// Insert a new document, returning it with its assigned identifier
    ///
    /// # Errors
    ///
    /// `StoreError::DuplicateName` if a document with the same root name exists.
    async fn insert(&self, tree: TreeNode) -> Result<TreeDocument, StoreError>;

    /// Overwrite the document named `name` with `tree`
    ///
    /// Does nothing when no document matches.
    async fn replace(&self, name: &str, tree: TreeNode) -> Result<ReplaceResult, StoreError>;

    /// Overwrite the document named `tree.name`, inserting it if absent
    async fn upsert(&self, tree: TreeNode) -> Result<UpsertResult, StoreError> {
        let name = tree.name.clone();
        let replaced = self.replace(&name, tree.clone()).await?;
        if replaced.matched > 0 {
            return Ok(UpsertResult {
                matched: replaced.matched,
                modified: replaced.modified,
                upserted: 0,
            });
        }

        match self.insert(tree.clone()).await {
            Ok(_) => Ok(UpsertResult {
                matched: 0,
                modified: 0,
                upserted: 1,
            }),
            // A concurrent writer created it after our replace found nothing
            Err(StoreError::DuplicateName { .. }) => {
                let replaced = self.replace(&name, tree).await?;
                Ok(UpsertResult {
                    matched: replaced.matched,
                    modified: replaced.modified,
                    upserted: 0,
                })
            }
            Err(e) => Err(e),
        }
    }
}
