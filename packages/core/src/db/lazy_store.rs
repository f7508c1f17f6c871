//! Process-wide, lazily opened store handle
//!
//! The store is opened on the first request that needs it and then kept for the life
//! of the process. There is one acquisition path (`LazyStore::get`) and no teardown;
//! clones share the same cell, so every handler sees the same connection.

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::db::{InMemoryTreeStore, LibsqlTreeStore, StoreError, TreeStore};

/// Which backend to open
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Embedded libsql database at the given path
    Libsql { db_path: PathBuf },
    /// Volatile in-process store
    Memory,
}

impl StoreBackend {
    async fn open(&self) -> Result<Arc<dyn TreeStore>, StoreError> {
        match self {
            StoreBackend::Libsql { db_path } => {
                tracing::info!("Opening libsql tree store at {}", db_path.display());
                Ok(Arc::new(LibsqlTreeStore::new(db_path.clone()).await?))
            }
            StoreBackend::Memory => {
                tracing::info!("Using in-memory tree store");
                Ok(Arc::new(InMemoryTreeStore::new()))
            }
        }
    }
}

#[derive(Clone)]
pub struct LazyStore {
    backend: StoreBackend,
    cell: Arc<OnceCell<Arc<dyn TreeStore>>>,
}

impl LazyStore {
    /// Handle that opens `backend` on first use
    pub fn new(backend: StoreBackend) -> Self {
        Self {
            backend,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Handle around a store that is already open
    pub fn from_store(store: Arc<dyn TreeStore>) -> Self {
        Self {
            backend: StoreBackend::Memory,
            cell: Arc::new(OnceCell::from(store)),
        }
    }

    pub fn backend(&self) -> &StoreBackend {
        &self.backend
    }

    /// True once the store has been opened
    pub fn is_open(&self) -> bool {
        self.cell.initialized()
    }

    /// The shared store, opening it if this is the first call.
    ///
    /// A failed open is not cached; the next call tries again.
    pub async fn get(&self) -> Result<Arc<dyn TreeStore>, StoreError> {
        self.cell
            .get_or_try_init(|| self.backend.open())
            .await
            .map(Arc::clone)
    }
}
