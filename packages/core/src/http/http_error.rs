//! HTTP error handling for the tree endpoints
//!
//! Every error body has the same shape, `{"message": "..."}`. Internal detail is
//! logged where the error is raised and never copied into the body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

pub const MSG_INVALID_DATA: &str = "Invalid data";
pub const MSG_INVALID_TREE: &str = "Invalid tree data provided";
pub const MSG_TREE_NAME_REQUIRED: &str = "Tree name is required to update";
pub const MSG_TREE_NOT_FOUND: &str = "Tree not found";
pub const MSG_PARENT_NOT_FOUND: &str = "Parent node not found";
pub const MSG_UPDATE_FAILED: &str = "Failed to update the tree";
pub const MSG_ADD_CHILD_FAILED: &str = "Failed to add child to the tree";
pub const MSG_INTERNAL: &str = "Internal Server Error";

/// Error response: a status code plus a caller-facing message
#[derive(Debug, Serialize)]
pub struct HttpError {
    #[serde(skip)]
    pub status: StatusCode,
    /// User-facing error message
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 400 - malformed or missing request fields
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// 404 - missing tree, missing parent, or nothing matched
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// 500 with a specific message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 500 with the generic message used for anything unexpected
    pub fn internal_server_error() -> Self {
        Self::internal(MSG_INTERNAL)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_has_only_message() {
        let err = HttpError::not_found(MSG_TREE_NOT_FOUND);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            serde_json::json!({"message": "Tree not found"})
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(HttpError::bad_request("x").status, StatusCode::BAD_REQUEST);
        assert_eq!(HttpError::not_found("x").status, StatusCode::NOT_FOUND);
        assert_eq!(
            HttpError::internal_server_error().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(HttpError::internal_server_error().message, MSG_INTERNAL);
    }

    #[test]
    fn test_into_response_uses_status() {
        let response = HttpError::bad_request(MSG_INVALID_DATA).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
