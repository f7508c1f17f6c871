//! Client-side error types

use thiserror::Error;

use crate::operations::MutationError;

/// Failure talking to the tree server
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx response; `message` is the server's `{"message": ...}` body when present
    #[error("Server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Errors returned by `SyncClient` operations
///
/// Push failures are not returned here; they arrive as `SyncEvent::PushFailed`.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Mutation(#[from] MutationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
