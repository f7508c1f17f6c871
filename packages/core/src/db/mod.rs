//! Document Store Layer
//!
//! This module holds the tree documents durably:
//!
//! - [`TreeStore`] - Backend-neutral trait (find, insert, replace, upsert)
//! - [`LibsqlTreeStore`] - Embedded libsql database, one row per tree
//! - [`InMemoryTreeStore`] - Volatile store for tests and throwaway servers
//! - [`LazyStore`] - Process-wide handle that opens the configured backend on first use
//!
//! # Architecture
//!
//! Every write replaces the whole document. There is no transaction around a
//! read-modify-write and no concurrency token, so two writers racing on the same
//! tree can lose an update.

mod error;
mod lazy_store;
mod libsql_store;
mod memory_store;
mod tree_store;

pub use error::StoreError;
pub use lazy_store::{LazyStore, StoreBackend};
pub use libsql_store::LibsqlTreeStore;
pub use memory_store::InMemoryTreeStore;
pub use tree_store::{ReplaceResult, TreeStore, UpsertResult};
