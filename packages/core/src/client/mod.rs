//! Sync Client
//!
//! Holds a session's tree, applies mutations to it immediately, and pushes each
//! change to the server in the background:
//!
//! - [`SyncClient`] - Snapshot owner and optimistic mutation entry point
//! - [`TreeTransport`] - The three `/tree` requests, with [`HttpTransport`] over reqwest
//! - [`SyncEvent`] - Per-push outcome published to subscribers
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use treesync_core::client::{HttpTransport, SyncClient};
//! use treesync_core::models::NodePatch;
//!
//! # async fn example() -> Result<(), treesync_core::client::SyncError> {
//! let transport = Arc::new(HttpTransport::new("http://127.0.0.1:3001"));
//! let client = SyncClient::load(transport).await?;
//!
//! let child = client.add_child("root")?;
//! client.update_node(&child.name, &NodePatch::new().with_data("Hello"))?;
//! # Ok(())
//! # }
//! ```

mod error;
mod sync_client;
mod transport;

pub use error::{SyncError, TransportError};
pub use sync_client::{PushOperation, SyncClient, SyncEvent, SYNC_EVENT_CHANNEL_CAPACITY};
pub use transport::{HttpTransport, TreeTransport};
