//! Child name allocation
//!
//! New children are named `<parent>-c<n>`, where `n` follows on from the suffix of
//! the last existing sibling. Only the sibling list is consulted, so the result is not
//! guaranteed to be unique across the whole tree: if the last sibling was renamed
//! away from the pattern the counter restarts at 1 and may reproduce a name an
//! earlier sibling already holds.

use crate::models::TreeNode;
use regex::Regex;
use std::sync::OnceLock;

/// Trailing `-c<digits>` suffix of a generated child name
const CHILD_SUFFIX_PATTERN: &str = r"-c(\d+)$";

/// Derive the name for a new child of `parent_name`.
///
/// # Examples
///
/// ```
/// use treesync_core::models::TreeNode;
/// use treesync_core::operations::generate_child_name;
///
/// assert_eq!(generate_child_name("root", None), "root-c1");
///
/// let siblings = vec![TreeNode::leaf("root-c1", "Data")];
/// assert_eq!(generate_child_name("root", Some(&siblings)), "root-c2");
///
/// let renamed = vec![TreeNode::leaf("groceries", "Data")];
/// assert_eq!(generate_child_name("root", Some(&renamed)), "root-c1");
/// ```
pub fn generate_child_name(parent_name: &str, existing_children: Option<&[TreeNode]>) -> String {
    let next = existing_children
        .and_then(|children| children.last())
        .and_then(|last| child_counter(&last.name))
        .and_then(|counter| counter.checked_add(1))
        .unwrap_or(1);

    format!("{}-c{}", parent_name, next)
}

/// Counter encoded in a `-c<digits>` suffix, if the name has one that fits in `u64`
fn child_counter(name: &str) -> Option<u64> {
    static SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();
    let suffix_regex = SUFFIX_REGEX.get_or_init(|| {
        Regex::new(CHILD_SUFFIX_PATTERN).expect("child suffix pattern is a valid regex")
    });

    suffix_regex
        .captures(name)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse::<u64>().ok())
}
