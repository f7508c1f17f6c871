//! libsql-backed TreeStore
//!
//! Stores each tree as one row of the `trees` table, with the root name as a unique
//! key and the logical document (no `_id`) as JSON text:
//!
//! ```sql
//! CREATE TABLE trees (
//!     id TEXT PRIMARY KEY,          -- store-internal identifier, returned as `_id`
//!     name TEXT NOT NULL UNIQUE,    -- root node name, the lookup key
//!     document TEXT NOT NULL,       -- TreeNode JSON
//!     created_at DATETIME,
//!     modified_at DATETIME
//! )
//! ```
//!
//! # Connection Handling
//!
//! Each operation opens a connection with `connect_with_timeout()`, which sets a busy
//! timeout so concurrent requests wait on the SQLite lock instead of failing.

use async_trait::async_trait;
use libsql::{Builder, Connection, Database};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use crate::db::{ReplaceResult, StoreError, TreeStore};
use crate::models::{from_json_str, TreeDocument, TreeNode};

/// Tree documents in an embedded libsql database
///
/// # Examples
///
/// ```no_run
/// use treesync_core::db::LibsqlTreeStore;
/// use std::path::PathBuf;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = LibsqlTreeStore::new(PathBuf::from("./data/trees.db")).await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct LibsqlTreeStore {
    db: Arc<Database>,
    db_path: PathBuf,
}

impl std::fmt::Debug for LibsqlTreeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibsqlTreeStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl LibsqlTreeStore {
    /// Open (or create) the database at `db_path` and initialize the schema.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the parent directory cannot be created, the database
    /// cannot be opened, or the schema cannot be created.
    pub async fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    if e.kind() == std::io::ErrorKind::PermissionDenied {
                        StoreError::permission_denied(db_path.clone())
                    } else {
                        StoreError::DirectoryCreationFailed(e)
                    }
                })?;
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| StoreError::connection_failed(db_path.clone(), e))?;

        let store = Self {
            db: Arc::new(db),
            db_path,
        };
        store.initialize_schema().await?;

        tracing::debug!("Opened tree store at {}", store.db_path.display());
        Ok(store)
    }

    pub fn db_path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through query() rather than execute().
    async fn execute_pragma(&self, conn: &Connection, pragma: &str) -> Result<(), StoreError> {
        let mut stmt = conn.prepare(pragma).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        let _ = stmt.query(()).await.map_err(|e| {
            StoreError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    async fn initialize_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect_with_timeout().await?;

        self.execute_pragma(&conn, "PRAGMA journal_mode = WAL").await?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS trees (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                document TEXT NOT NULL,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                modified_at DATETIME DEFAULT CURRENT_TIMESTAMP
            )",
            (),
        )
        .await
        .map_err(|e| StoreError::sql_execution(format!("Failed to create trees table: {}", e)))?;

        Ok(())
    }

    /// Connection with a 5 second busy timeout
    async fn connect_with_timeout(&self) -> Result<Connection, StoreError> {
        let conn = self.db.connect()?;
        self.execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;
        Ok(conn)
    }

    async fn load_document(
        &self,
        conn: &Connection,
        name: &str,
    ) -> Result<Option<TreeNode>, StoreError> {
        let mut rows = conn
            .query("SELECT document FROM trees WHERE name = ?", [name])
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to query tree '{}': {}", name, e))
            })?;

        match rows.next().await? {
            Some(row) => {
                let document: String = row.get(0)?;
                Ok(Some(from_json_str(&document)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TreeStore for LibsqlTreeStore {
    async fn find_all(&self) -> Result<Vec<TreeDocument>, StoreError> {
        let conn = self.connect_with_timeout().await?;
        let mut rows = conn
            .query("SELECT id, document FROM trees ORDER BY rowid", ())
            .await
            .map_err(|e| StoreError::sql_execution(format!("Failed to list trees: {}", e)))?;

        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            let id: String = row.get(0)?;
            let document: String = row.get(1)?;
            documents.push(TreeDocument::new(id, from_json_str(&document)?));
        }
        Ok(documents)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<TreeNode>, StoreError> {
        let conn = self.connect_with_timeout().await?;
        self.load_document(&conn, name).await
    }

    async fn insert(&self, tree: TreeNode) -> Result<TreeDocument, StoreError> {
        let conn = self.connect_with_timeout().await?;
        let id = Uuid::new_v4().to_string();
        let document = serde_json::to_string(&tree)?;

        // The UNIQUE name column decides races between concurrent inserts
        let inserted = conn
            .execute(
                "INSERT INTO trees (id, name, document) VALUES (?, ?, ?)
                 ON CONFLICT(name) DO NOTHING",
                (id.as_str(), tree.name.as_str(), document.as_str()),
            )
            .await
            .map_err(|e| StoreError::sql_execution(format!("Failed to insert tree: {}", e)))?;

        if inserted == 0 {
            return Err(StoreError::duplicate_name(tree.name));
        }
        Ok(TreeDocument::new(id, tree))
    }

    async fn replace(&self, name: &str, tree: TreeNode) -> Result<ReplaceResult, StoreError> {
        let conn = self.connect_with_timeout().await?;
        let Some(existing) = self.load_document(&conn, name).await? else {
            return Ok(ReplaceResult::default());
        };

        if existing == tree {
            return Ok(ReplaceResult {
                matched: 1,
                modified: 0,
            });
        }

        let document = serde_json::to_string(&tree)?;
        let modified = conn
            .execute(
                "UPDATE trees SET name = ?, document = ?, modified_at = CURRENT_TIMESTAMP
                 WHERE name = ?",
                (tree.name.as_str(), document.as_str(), name),
            )
            .await
            .map_err(|e| {
                StoreError::sql_execution(format!("Failed to update tree '{}': {}", name, e))
            })?;

        Ok(ReplaceResult {
            matched: 1,
            modified,
        })
    }
}
