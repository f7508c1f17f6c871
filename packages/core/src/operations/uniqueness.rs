//! Whole-tree name uniqueness check

use crate::models::TreeNode;

/// True if any node in `tree`, the root included, is named `candidate_name`.
///
/// # Examples
///
/// ```
/// use treesync_core::models::TreeNode;
/// use treesync_core::operations::name_exists;
///
/// let tree = TreeNode::root().with_child(TreeNode::leaf("root-c1", "Data"));
/// assert!(name_exists(&tree, "root"));
/// assert!(name_exists(&tree, "root-c1"));
/// assert!(!name_exists(&tree, "root-c2"));
/// ```
pub fn name_exists(tree: &TreeNode, candidate_name: &str) -> bool {
    tree.iter().any(|node| node.name == candidate_name)
}
