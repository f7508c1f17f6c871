//! Tree Service - Server-side mutation and merge
//!
//! Loads the stored document, re-runs the same add-child algorithm the client ran,
//! and commits the result as a whole-document write.
//!
//! # Consistency
//!
//! Each mutation is a read followed by a write with nothing tying the two together.
//! Two concurrent add-child or replace calls against the same tree can interleave and
//! one write can overwrite the other.

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::db::{LazyStore, StoreError, TreeStore, UpsertResult};
use crate::models::{TreeDocument, TreeNode, ROOT_NAME};
use crate::operations::{self, ChildSpec};
use crate::services::error::TreeServiceError;

/// Stateless persistence adapter for the `/tree` resource
#[derive(Clone)]
pub struct TreeService {
    store: LazyStore,
}

impl TreeService {
    pub fn new(store: LazyStore) -> Self {
        Self { store }
    }

    /// Service over a store that is already open
    pub fn with_store(store: Arc<dyn TreeStore>) -> Self {
        Self::new(LazyStore::from_store(store))
    }

    /// Every stored tree, creating the default root first if the store is empty.
    ///
    /// Reading an empty store twice returns the same single document.
    #[instrument(skip(self))]
    pub async fn read_trees(&self) -> Result<Vec<TreeDocument>, TreeServiceError> {
        let store = self.store.get().await?;

        let trees = store.find_all().await?;
        if !trees.is_empty() {
            debug!("Read {} stored tree(s)", trees.len());
            return Ok(trees);
        }

        match store.insert(TreeNode::root()).await {
            Ok(document) => {
                info!("Store was empty, created default '{}' tree", ROOT_NAME);
                Ok(vec![document])
            }
            // Another request created it between our read and insert
            Err(StoreError::DuplicateName { .. }) => Ok(store.find_all().await?),
            Err(e) => Err(e.into()),
        }
    }

    /// Attach `child` under `parent_name` in the `root` tree and persist the document.
    ///
    /// Returns the attached child.
    ///
    /// # Errors
    ///
    /// - `TreeNotFound` if no `root` document exists
    /// - `ParentNotFound` if no node in it is named `parent_name`
    /// - `NotModified` if the store reports the write changed nothing
    #[instrument(skip(self, child), fields(child = %child.name))]
    pub async fn add_child(
        &self,
        parent_name: &str,
        child: TreeNode,
    ) -> Result<TreeNode, TreeServiceError> {
        let store = self.store.get().await?;

        let tree = store
            .find_by_name(ROOT_NAME)
            .await?
            .ok_or_else(|| TreeServiceError::tree_not_found(ROOT_NAME))?;

        // add_child only fails when the parent is missing
        let outcome = operations::add_child(&tree, parent_name, ChildSpec::Provided(child))
            .map_err(|_| TreeServiceError::parent_not_found(parent_name))?;

        if name_repeats(&outcome.tree, &outcome.child.name) {
            warn!(
                "Child name '{}' is already used elsewhere in the tree",
                outcome.child.name
            );
        }

        let result = store.replace(ROOT_NAME, outcome.tree).await?;
        if result.modified == 0 {
            return Err(TreeServiceError::not_modified(ROOT_NAME));
        }

        info!("Added child '{}' under '{}'", outcome.child.name, parent_name);
        Ok(outcome.child)
    }

    /// Upsert a whole tree keyed by its root name.
    ///
    /// # Errors
    ///
    /// `NoMatch` if the store neither matched nor inserted a document.
    #[instrument(skip(self, tree), fields(name = %tree.name))]
    pub async fn replace_tree(&self, tree: TreeNode) -> Result<UpsertResult, TreeServiceError> {
        let store = self.store.get().await?;
        let name = tree.name.clone();

        let duplicates = tree.duplicate_names();
        if !duplicates.is_empty() {
            warn!("Replacing tree '{}' with duplicate names: {:?}", name, duplicates);
        }

        let result = store.upsert(tree).await?;
        if result.is_noop() {
            return Err(TreeServiceError::no_match(name));
        }

        if result.upserted > 0 {
            info!("Inserted tree '{}'", name);
        } else {
            info!("Replaced tree '{}' (modified: {})", name, result.modified);
        }
        Ok(result)
    }
}

fn name_repeats(tree: &TreeNode, name: &str) -> bool {
    tree.iter().filter(|node| node.name == name).count() > 1
}

#[cfg(test)]
#[path = "tree_service_test.rs"]
mod tree_service_test;
