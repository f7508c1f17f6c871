//! Runtime server configuration
//!
//! `ServerConfig` is built once at startup from environment variables and is
//! immutable afterwards.
//!
//! # Environment Variables
//!
//! - `TREESYNC_HOST`: Bind address (default: 127.0.0.1)
//! - `TREESYNC_PORT`: Server port (default: 3001)
//! - `TREESYNC_STORE`: `libsql` (default) or `memory`
//! - `TREESYNC_DB_PATH`: Database file (default: ~/.treesync/database/trees.db)
//! - `CORS_ALLOW_ORIGIN`: Single allowed origin, replacing the development defaults

use std::collections::HashMap;
use std::path::PathBuf;

use crate::db::StoreBackend;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store: StoreBackend::Libsql {
                db_path: default_database_path(),
            },
            cors_allow_origin: None,
        }
    }
}

impl ServerConfig {
    /// Build from the process environment
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build from an explicit variable map; unset or invalid values fall back to
    /// defaults
    pub fn from_vars(vars: HashMap<String, String>) -> Self {
        let host = vars
            .get("TREESYNC_HOST")
            .filter(|host| !host.is_empty())
            .cloned()
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match vars.get("TREESYNC_PORT") {
            Some(raw) => raw.parse::<u16>().unwrap_or_else(|_| {
                tracing::warn!("Invalid TREESYNC_PORT '{}', using {}", raw, DEFAULT_PORT);
                DEFAULT_PORT
            }),
            None => DEFAULT_PORT,
        };

        let db_path = vars
            .get("TREESYNC_DB_PATH")
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let store = match vars.get("TREESYNC_STORE").map(|s| s.to_ascii_lowercase()) {
            Some(kind) if kind == "memory" => StoreBackend::Memory,
            Some(kind) if kind == "libsql" => StoreBackend::Libsql { db_path },
            Some(kind) => {
                tracing::warn!("Unknown TREESYNC_STORE '{}', using libsql", kind);
                StoreBackend::Libsql { db_path }
            }
            None => StoreBackend::Libsql { db_path },
        };

        let cors_allow_origin = vars
            .get("CORS_ALLOW_ORIGIN")
            .filter(|origin| !origin.is_empty())
            .cloned();

        Self {
            host,
            port,
            store,
            cors_allow_origin,
        }
    }

    /// `host:port` to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `~/.treesync/database/trees.db`, or a relative path if no home directory is known
pub fn default_database_path() -> PathBuf {
    let base = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(".treesync").join("database").join("trees.db")
}
