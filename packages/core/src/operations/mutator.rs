//! Recursive locate/add/update over a tree
//!
//! Both operations locate their target depth-first, pre-order, visiting children in
//! order, and stop at the first node whose name matches. Neither touches the tree
//! they are given: the target is found on the borrowed tree, then the change is made
//! on a fresh clone, so a snapshot that has been handed out is never modified.

use crate::models::{NodePatch, TreeNode};
use crate::operations::error::MutationError;
use crate::operations::naming::generate_child_name;
use crate::operations::uniqueness::name_exists;

/// Payload given to generated children
pub const DEFAULT_CHILD_DATA: &str = "Data";

/// What to attach under the parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildSpec {
    /// Name the child from its future siblings and give it the default payload
    Generated,
    /// Attach this exact node (the client already allocated its name)
    Provided(TreeNode),
}

/// Result of a successful add-child
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddChildOutcome {
    /// The new snapshot
    pub tree: TreeNode,
    /// The node that was attached, for propagation to the store
    pub child: TreeNode,
}

/// Attach a child under the node named `parent_name`.
///
/// A parent that carries `data` loses it and becomes an internal node; with no
/// prior children that leaves exactly one child. Otherwise the child is appended
/// after the existing children.
///
/// # Errors
///
/// `MutationError::ParentNotFound` if no node is named `parent_name`. The input tree
/// is untouched in every case.
///
/// # Examples
///
/// ```
/// use treesync_core::models::TreeNode;
/// use treesync_core::operations::{add_child, ChildSpec};
///
/// let tree = TreeNode::root();
/// let outcome = add_child(&tree, "root", ChildSpec::Generated).unwrap();
/// assert_eq!(outcome.child, TreeNode::leaf("root-c1", "Data"));
/// assert_eq!(outcome.tree.children().len(), 1);
/// assert!(tree.children().is_empty());
/// ```
pub fn add_child(
    tree: &TreeNode,
    parent_name: &str,
    spec: ChildSpec,
) -> Result<AddChildOutcome, MutationError> {
    let path = locate(tree, parent_name)
        .ok_or_else(|| MutationError::parent_not_found(parent_name))?;

    let mut next = tree.clone();
    let parent = node_at_mut(&mut next, &path)
        .ok_or_else(|| MutationError::parent_not_found(parent_name))?;

    let child = match spec {
        ChildSpec::Generated => TreeNode::leaf(
            generate_child_name(&parent.name, parent.children.as_deref()),
            DEFAULT_CHILD_DATA,
        ),
        ChildSpec::Provided(child) => child,
    };

    // Leaf -> internal is one-way
    parent.data = None;
    parent
        .children
        .get_or_insert_with(Vec::new)
        .push(child.clone());

    Ok(AddChildOutcome { tree: next, child })
}

/// Merge `patch` into the node named `target_name`.
///
/// A rename is checked against every name in the tree first; if the new name is
/// taken the update is rejected as a whole and no field is applied. Renaming a node
/// to its current name is allowed.
///
/// # Errors
///
/// - `MutationError::NodeNotFound` if no node is named `target_name`
/// - `MutationError::NameTaken` if the rename would duplicate a name
pub fn update_node(
    tree: &TreeNode,
    target_name: &str,
    patch: &NodePatch,
) -> Result<TreeNode, MutationError> {
    let path =
        locate(tree, target_name).ok_or_else(|| MutationError::node_not_found(target_name))?;

    if let Some(new_name) = patch.name.as_deref() {
        if new_name != target_name && name_exists(tree, new_name) {
            return Err(MutationError::name_taken(new_name));
        }
    }

    let mut next = tree.clone();
    let node =
        node_at_mut(&mut next, &path).ok_or_else(|| MutationError::node_not_found(target_name))?;
    patch.apply_to(node);

    Ok(next)
}

/// Child-index path from `node` to the first pre-order match of `name`
fn locate(node: &TreeNode, name: &str) -> Option<Vec<usize>> {
    if node.name == name {
        return Some(Vec::new());
    }

    node.children().iter().enumerate().find_map(|(index, child)| {
        locate(child, name).map(|mut path| {
            path.insert(0, index);
            path
        })
    })
}

fn node_at_mut<'a>(mut node: &'a mut TreeNode, path: &[usize]) -> Option<&'a mut TreeNode> {
    for &index in path {
        node = node.children.as_mut()?.get_mut(index)?;
    }
    Some(node)
}

#[cfg(test)]
#[path = "mutator_test.rs"]
mod mutator_test;
