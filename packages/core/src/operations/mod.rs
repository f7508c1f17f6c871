//! Tree Operations
//!
//! The algorithms run identically by the sync client and by the server:
//!
//! - [`generate_child_name`] - Name allocation for new children
//! - [`add_child`] / [`update_node`] - Copy-on-write mutations
//! - [`name_exists`] - Whole-tree uniqueness check used before renames
//!
//! Consistency between the two sides depends on both reaching the same result from
//! the same inputs; there is no mutation log or diff format.

pub mod error;
mod mutator;
mod naming;
mod uniqueness;

pub use error::MutationError;
pub use mutator::{add_child, update_node, AddChildOutcome, ChildSpec, DEFAULT_CHILD_DATA};
pub use naming::generate_child_name;
pub use uniqueness::name_exists;
