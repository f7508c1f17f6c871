//! Tree Server Binary
//!
//! Serves the `/tree` resource over HTTP, backed by an embedded libsql database or
//! an in-memory store.
//!
//! # Usage
//!
//! ```bash
//! # Default settings (127.0.0.1:3001, ~/.treesync/database/trees.db)
//! cargo run --bin tree-server
//!
//! # Throwaway in-memory store on another port
//! TREESYNC_STORE=memory TREESYNC_PORT=3002 cargo run --bin tree-server
//! ```
//!
//! # Environment Variables
//!
//! - `TREESYNC_HOST`, `TREESYNC_PORT`, `TREESYNC_STORE`, `TREESYNC_DB_PATH`,
//!   `CORS_ALLOW_ORIGIN`: see `treesync_core::config`
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")

use treesync_core::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!("treesync tree server");
    tracing::info!("Listening address: {}", config.bind_address());

    treesync_core::http::start_server(config).await
}
