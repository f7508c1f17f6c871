//! Tree Data Structures
//!
//! This module defines the `TreeNode` struct and the types that travel with it:
//! the partial update (`NodePatch`) and the stored document wrapper (`TreeDocument`).
//!
//! # Architecture
//!
//! - **Identity by name**: `name` is the only key. There is no hidden node id; lookups
//!   rebuild a name index by traversal when they need one.
//! - **Leaf or internal**: a node carries `data` or `children`, never both in steady
//!   state. Adding a child to a data node turns it into an internal node for good.
//! - **Document = root**: one stored document per tree, keyed by the root's name.
//!
//! # Examples
//!
//! ```rust
//! use treesync_core::models::TreeNode;
//!
//! let tree = TreeNode::root()
//!     .with_child(TreeNode::leaf("root-c1", "Data"))
//!     .with_child(TreeNode::leaf("root-c2", "Data"));
//!
//! assert_eq!(tree.node_count(), 3);
//! assert!(tree.find("root-c2").is_some());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Name of the root node, which is also the lookup key of the stored document
pub const ROOT_NAME: &str = "root";

/// Store-internal identifier field carried by stored documents
pub const INTERNAL_ID_FIELD: &str = "_id";

/// A single node of the tree.
///
/// # Fields
///
/// - `name`: Unique across the whole tree
/// - `data`: Optional opaque payload (leaf nodes)
/// - `children`: Optional ordered children (internal nodes), insertion order preserved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Create an empty leaf with neither data nor children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
            children: None,
        }
    }

    /// The default root document: `{name: "root", children: []}`
    pub fn root() -> Self {
        Self {
            name: ROOT_NAME.to_string(),
            data: None,
            children: Some(Vec::new()),
        }
    }

    /// Create a leaf node carrying a payload
    pub fn leaf(name: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Some(data.into()),
            children: None,
        }
    }

    /// Append a child, creating the children sequence if needed (builder style)
    pub fn with_child(mut self, child: TreeNode) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    /// Children as a slice (empty when absent)
    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    /// True when the node has no children
    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// Depth-first, pre-order iterator over this node and all descendants
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }

    /// Number of nodes in the subtree rooted here (including this node)
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// First node in pre-order whose name matches
    pub fn find(&self, name: &str) -> Option<&TreeNode> {
        self.iter().find(|node| node.name == name)
    }

    /// Map from name to node, rebuilt by traversal.
    ///
    /// When names collide the first node in pre-order wins, which matches the
    /// short-circuiting lookups used by the mutation algorithms.
    pub fn name_index(&self) -> HashMap<&str, &TreeNode> {
        let mut index = HashMap::new();
        for node in self.iter() {
            index.entry(node.name.as_str()).or_insert(node);
        }
        index
    }

    /// Names used by more than one node, in order of their second occurrence
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen = HashMap::new();
        let mut duplicates = Vec::new();
        for node in self.iter() {
            let count = seen.entry(node.name.as_str()).or_insert(0usize);
            *count += 1;
            if *count == 2 {
                duplicates.push(node.name.clone());
            }
        }
        duplicates
    }
}

/// Pre-order traversal over a borrowed tree
pub struct PreOrder<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reversed so the first child is visited next
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Partial node update
///
/// Only supplied fields are applied; each one overwrites the node's field
/// (shallow merge).
///
/// # Examples
///
/// ```rust
/// use treesync_core::models::NodePatch;
///
/// let rename = NodePatch::new().with_name("inbox");
/// assert!(rename.renames());
/// assert!(!NodePatch::new().with_data("hello").renames());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// True if the patch carries a `name` field
    pub fn renames(&self) -> bool {
        self.name.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.data.is_none()
    }

    /// Overwrite the node's fields with the supplied ones
    pub(crate) fn apply_to(&self, node: &mut TreeNode) {
        if let Some(name) = &self.name {
            node.name = name.clone();
        }
        if let Some(data) = &self.data {
            node.data = Some(data.clone());
        }
    }
}

/// A tree as held by the document store
///
/// Serializes flat: `{"_id": "...", "name": "root", "children": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDocument {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub tree: TreeNode,
}

impl TreeDocument {
    pub fn new(id: impl Into<String>, tree: TreeNode) -> Self {
        Self {
            id: id.into(),
            tree,
        }
    }

    /// Drop the store identifier, keeping the logical document
    pub fn into_tree(self) -> TreeNode {
        self.tree
    }
}

/// Remove the store-internal identifier from a client-supplied JSON document
pub fn strip_internal_id(document: &mut serde_json::Value) {
    if let Some(object) = document.as_object_mut() {
        object.remove(INTERNAL_ID_FIELD);
    }
}
