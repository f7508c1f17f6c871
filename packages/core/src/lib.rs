//! treesync Core
//!
//! A named-tree mutation and sync engine. A client edits a hierarchical tree of named
//! nodes locally and pushes each change to a server, which re-applies the same
//! structural mutation to its durable copy.
//!
//! # Architecture
//!
//! - **Copy-on-write snapshots**: Mutations never touch the tree they are given
//! - **Name-addressed nodes**: Every node is found by its globally unique name
//! - **Whole-document writes**: The store replaces the full tree on every change
//! - **Optimistic client**: Local state is never rolled back on a remote failure
//!
//! # Modules
//!
//! - [`models`] - Tree node, patch and stored document types
//! - [`operations`] - Name allocation, add-child, update and uniqueness checks
//! - [`db`] - Document stores (libsql, in-memory) and the lazily opened handle
//! - [`services`] - Server-side persistence adapter
//! - [`http`] - axum router for the `/tree` resource
//! - [`client`] - Sync client and its HTTP transport
//! - [`config`] - Environment-driven server configuration

pub mod client;
pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use client::{SyncClient, SyncError, SyncEvent};
pub use models::{NodePatch, TreeDocument, TreeNode};
pub use operations::MutationError;
pub use services::TreeService;
