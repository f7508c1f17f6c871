//! HTTP server for the `/tree` resource
//!
//! Exposes the persistence service over JSON. Requests are traced with
//! `TraceLayer`, and a panicking handler is turned into a generic 500 instead of
//! dropping the connection.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin tree-server
//!
//! # In-memory store on another port
//! TREESYNC_STORE=memory TREESYNC_PORT=3002 cargo run --bin tree-server
//! ```
//!
//! # Security
//!
//! - No authentication
//! - CORS restricted to local development origins unless `CORS_ALLOW_ORIGIN` is set

use axum::{
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{self, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::db::LazyStore;
use crate::services::TreeService;

mod http_error;
mod tree_endpoints;

pub use http_error::HttpError;
pub use tree_endpoints::{MessageResponse, ALLOWED_METHODS, TREE_PATH};

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub tree_service: TreeService,
}

impl AppState {
    pub fn new(tree_service: TreeService) -> Self {
        Self { tree_service }
    }
}

/// Create the application router
///
/// `cors_allow_origin` overrides the default development origins.
pub fn create_router(state: AppState, cors_allow_origin: Option<&str>) -> Router {
    Router::new()
        .merge(tree_endpoints::routes(state))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_allow_origin))
}

/// Create CORS layer
///
/// Default origins cover the usual local frontend dev servers.
fn cors_layer(custom_origin: Option<&str>) -> CorsLayer {
    let default_origins = [
        "http://localhost:3000",
        "http://localhost:5173",
        "http://localhost:1420",
    ];

    let candidates: Vec<&str> = match custom_origin {
        Some(origin) => vec![origin],
        None => default_origins.to_vec(),
    };

    let origins: Vec<HeaderValue> = candidates
        .into_iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(cors::Any)
        .allow_credentials(false)
}

/// Collapse a handler panic into the generic 500 body
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!("Request handler panicked: {}", detail);
    HttpError::internal_server_error().into_response()
}

/// Start the HTTP server
///
/// The store is not opened here; the first request that needs it opens it.
///
/// # Errors
///
/// Returns error if the server fails to bind or stops with an I/O error.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    let service = TreeService::new(LazyStore::new(config.store.clone()));
    let app = create_router(AppState::new(service), config.cors_allow_origin.as_deref());

    let addr = config.bind_address();
    tracing::info!("Tree server starting on http://{}", addr);
    tracing::info!("Store backend: {:?}", config.store);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
