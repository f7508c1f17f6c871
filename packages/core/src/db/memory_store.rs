//! In-memory TreeStore
//!
//! Keeps documents in insertion order behind a mutex. Used by tests and by the
//! server when `TREESYNC_STORE=memory`; contents are lost when the process exits.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use crate::db::{ReplaceResult, StoreError, TreeStore};
use crate::models::{TreeDocument, TreeNode};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTreeStore {
    documents: Arc<Mutex<Vec<TreeDocument>>>,
}

impl InMemoryTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing trees (identifiers are generated)
    pub fn with_trees(trees: Vec<TreeNode>) -> Self {
        let documents = trees
            .into_iter()
            .map(|tree| TreeDocument::new(Uuid::new_v4().to_string(), tree))
            .collect();

        Self {
            documents: Arc::new(Mutex::new(documents)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<TreeDocument>>, StoreError> {
        self.documents.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

#[async_trait]
impl TreeStore for InMemoryTreeStore {
    async fn find_all(&self) -> Result<Vec<TreeDocument>, StoreError> {
        Ok(self.lock()?.clone())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TreeNode>, StoreError> {
        let documents = self.lock()?;
        Ok(documents
            .iter()
            .find(|doc| doc.tree.name == name)
            .map(|doc| doc.tree.clone()))
    }

    async fn insert(&self, tree: TreeNode) -> Result<TreeDocument, StoreError> {
        let mut documents = self.lock()?;
        if documents.iter().any(|doc| doc.tree.name == tree.name) {
            return Err(StoreError::duplicate_name(tree.name));
        }

        let document = TreeDocument::new(Uuid::new_v4().to_string(), tree);
        documents.push(document.clone());
        Ok(document)
    }

    async fn replace(&self, name: &str, tree: TreeNode) -> Result<ReplaceResult, StoreError> {
        let mut documents = self.lock()?;
        let Some(existing) = documents.iter_mut().find(|doc| doc.tree.name == name) else {
            return Ok(ReplaceResult::default());
        };

        if existing.tree == tree {
            return Ok(ReplaceResult {
                matched: 1,
                modified: 0,
            });
        }

        existing.tree = tree;
        Ok(ReplaceResult {
            matched: 1,
            modified: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::UpsertResult;

    #[tokio::test]
    async fn test_empty_store() {
        let store = InMemoryTreeStore::new();
        assert!(store.find_all().await.unwrap().is_empty());
        assert!(store.find_by_name("root").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_rejects_duplicates() {
        let store = InMemoryTreeStore::new();
        let doc = store.insert(TreeNode::root()).await.unwrap();
        assert!(!doc.id.is_empty());
        assert_eq!(doc.tree, TreeNode::root());

        let err = store.insert(TreeNode::root()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateName { .. }));
    }

    #[tokio::test]
    async fn test_replace_reports_modified_only_on_change() {
        let store = InMemoryTreeStore::with_trees(vec![TreeNode::root()]);

        let same = store.replace("root", TreeNode::root()).await.unwrap();
        assert_eq!(same, ReplaceResult { matched: 1, modified: 0 });

        let changed_tree = TreeNode::root().with_child(TreeNode::leaf("root-c1", "Data"));
        let changed = store.replace("root", changed_tree.clone()).await.unwrap();
        assert_eq!(changed, ReplaceResult { matched: 1, modified: 1 });
        assert_eq!(store.find_by_name("root").await.unwrap(), Some(changed_tree));

        let missing = store.replace("other", TreeNode::new("other")).await.unwrap();
        assert_eq!(missing, ReplaceResult::default());
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_replaces() {
        let store = InMemoryTreeStore::new();

        let inserted = store.upsert(TreeNode::root()).await.unwrap();
        assert_eq!(inserted.upserted, 1);
        assert!(!inserted.is_noop());

        let tree = TreeNode::root().with_child(TreeNode::leaf("a", "b"));
        let replaced = store.upsert(tree.clone()).await.unwrap();
        assert_eq!(replaced, UpsertResult { matched: 1, modified: 1, upserted: 0 });

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].tree, tree);
    }

    #[test]
    fn test_clones_share_documents() {
        let store = InMemoryTreeStore::with_trees(vec![TreeNode::new("a"), TreeNode::new("b")]);
        let clone = store.clone();

        let docs = tokio_test::block_on(clone.find_all()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_ne!(docs[0].id, docs[1].id);

        tokio_test::block_on(store.insert(TreeNode::root())).unwrap();
        assert_eq!(tokio_test::block_on(clone.find_all()).unwrap().len(), 3);
    }
}
