//! Data Models
//!
//! This module contains the data structures shared by the client and the server:
//!
//! - `TreeNode` - A named node holding either a payload or ordered children
//! - `NodePatch` - Partial fields applied by an update
//! - `TreeDocument` - A stored tree together with its store-internal identifier
//! - [`from_json_slice`] / [`from_json_str`] - Tree decoding without a nesting limit

mod json;
mod tree_node;

pub use json::{from_json_slice, from_json_str};
pub use tree_node::{
    strip_internal_id, NodePatch, PreOrder, TreeDocument, TreeNode, INTERNAL_ID_FIELD, ROOT_NAME,
};
