//! `/tree` Endpoints
//!
//! # Endpoints
//!
//! - `GET /tree` - All stored trees (creates the default root if the store is empty)
//! - `POST /tree` - Add a child: `{"parentName": "...", "child": {...}}`
//! - `PUT /tree` - Upsert a whole tree: `{"tree": {...}}`
//! - anything else, `HEAD` included - 405 with `Allow: GET, POST, PUT`
//!
//! Request bodies are parsed by hand rather than with the `Json` extractor so that
//! malformed input gets the same `{"message": ...}` 400 body as a missing field.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::http_error::{
    HttpError, MSG_ADD_CHILD_FAILED, MSG_INVALID_DATA, MSG_INVALID_TREE, MSG_PARENT_NOT_FOUND,
    MSG_TREE_NAME_REQUIRED, MSG_TREE_NOT_FOUND, MSG_UPDATE_FAILED,
};
use crate::http::AppState;
use crate::models::{from_json_slice, strip_internal_id, TreeDocument, TreeNode};
use crate::services::TreeServiceError;

pub const TREE_PATH: &str = "/tree";
pub const ALLOWED_METHODS: &str = "GET, POST, PUT";

pub const MSG_CHILD_ADDED: &str = "Child node added successfully";
pub const MSG_TREE_UPDATED: &str = "Tree hierarchy updated successfully";

/// Success body for writes
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Json<Self> {
        Json(Self {
            message: message.into(),
        })
    }
}

/// Body of `POST /tree`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddChildRequest {
    parent_name: Option<String>,
    child: Option<TreeNode>,
}

/// Read every stored tree
///
/// # Example
///
/// ```bash
/// curl http://localhost:3001/tree
/// ```
async fn read_trees(
    State(state): State<AppState>,
) -> Result<Json<Vec<TreeDocument>>, HttpError> {
    let trees = state.tree_service.read_trees().await.map_err(|e| {
        tracing::error!("Failed to read trees: {:?}", e);
        HttpError::internal_server_error()
    })?;

    Ok(Json(trees))
}

/// Add a child under a named parent of the `root` tree
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:3001/tree \
///   -H "Content-Type: application/json" \
///   -d '{"parentName": "root", "child": {"name": "root-c1", "data": "Data"}}'
/// ```
async fn add_child(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, HttpError> {
    let request: AddChildRequest = from_json_slice(&body).map_err(|e| {
        tracing::debug!("Rejected add-child body: {}", e);
        HttpError::bad_request(MSG_INVALID_DATA)
    })?;

    let (parent_name, child) = match (request.parent_name, request.child) {
        (Some(parent_name), Some(child)) if !parent_name.is_empty() => (parent_name, child),
        _ => return Err(HttpError::bad_request(MSG_INVALID_DATA)),
    };

    match state.tree_service.add_child(&parent_name, child).await {
        Ok(_) => Ok(MessageResponse::new(MSG_CHILD_ADDED)),
        Err(TreeServiceError::TreeNotFound { .. }) => {
            Err(HttpError::not_found(MSG_TREE_NOT_FOUND))
        }
        Err(TreeServiceError::ParentNotFound { .. }) => {
            Err(HttpError::not_found(MSG_PARENT_NOT_FOUND))
        }
        Err(TreeServiceError::NotModified { .. }) => {
            tracing::error!("Add-child under '{}' did not modify the tree", parent_name);
            Err(HttpError::internal(MSG_UPDATE_FAILED))
        }
        Err(e) => {
            tracing::error!("Error updating tree: {:?}", e);
            Err(HttpError::internal(MSG_ADD_CHILD_FAILED))
        }
    }
}

/// Upsert a whole tree keyed by its root name
///
/// # Example
///
/// ```bash
/// curl -X PUT http://localhost:3001/tree \
///   -H "Content-Type: application/json" \
///   -d '{"tree": {"name": "root", "children": []}}'
/// ```
async fn replace_tree(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<MessageResponse>, HttpError> {
    let tree = parse_replace_body(&body)?;

    match state.tree_service.replace_tree(tree).await {
        Ok(_) => Ok(MessageResponse::new(MSG_TREE_UPDATED)),
        Err(TreeServiceError::NoMatch { .. }) => Err(HttpError::not_found(MSG_TREE_NOT_FOUND)),
        Err(e) => {
            tracing::error!("Failed to replace tree: {:?}", e);
            Err(HttpError::internal_server_error())
        }
    }
}

/// Validate `{"tree": {...}}` and return the tree with any `_id` removed
fn parse_replace_body(body: &[u8]) -> Result<TreeNode, HttpError> {
    let body: Value = from_json_slice(body).map_err(|_| HttpError::bad_request(MSG_INVALID_TREE))?;

    let mut tree = match body.get("tree") {
        Some(tree) if tree.is_object() => tree.clone(),
        _ => return Err(HttpError::bad_request(MSG_INVALID_TREE)),
    };

    let has_name = matches!(tree.get("name"), Some(Value::String(name)) if !name.is_empty());
    if !has_name {
        return Err(HttpError::bad_request(MSG_TREE_NAME_REQUIRED));
    }

    strip_internal_id(&mut tree);
    serde_json::from_value(tree).map_err(|e| {
        tracing::debug!("Rejected tree document: {}", e);
        HttpError::bad_request(MSG_INVALID_TREE)
    })
}

async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, ALLOWED_METHODS)],
        MessageResponse::new(format!("Method {} not allowed", method)),
    )
        .into_response()
}

/// Router for the `/tree` resource
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route(
            TREE_PATH,
            get(read_trees)
                .post(add_child)
                .put(replace_tree)
                // get() would otherwise answer HEAD too
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_replace_body_strips_internal_id() {
        let body = br#"{"tree": {"_id": "abc", "name": "root", "children": []}}"#;
        assert_eq!(parse_replace_body(body).unwrap(), TreeNode::root());
    }

    #[test]
    fn test_parse_replace_body_rejections() {
        let cases: [(&[u8], &str); 6] = [
            (b"not json", MSG_INVALID_TREE),
            (b"{}", MSG_INVALID_TREE),
            (br#"{"tree": "root"}"#, MSG_INVALID_TREE),
            (br#"{"tree": {"children": []}}"#, MSG_TREE_NAME_REQUIRED),
            (br#"{"tree": {"name": ""}}"#, MSG_TREE_NAME_REQUIRED),
            (br#"{"tree": {"name": "root", "children": "nope"}}"#, MSG_INVALID_TREE),
        ];

        for (body, expected) in cases {
            let err = parse_replace_body(body).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message, expected);
        }
    }
}
