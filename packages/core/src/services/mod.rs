//! Business Services
//!
//! - `TreeService` - Server-side persistence adapter: read with lazy default-root
//!   creation, add-child merge, and whole-tree upsert
//!
//! Services sit between the HTTP layer and the document store, re-running the tree
//! algorithms against the durable copy.

pub mod error;
pub mod tree_service;

pub use error::TreeServiceError;
pub use tree_service::TreeService;
