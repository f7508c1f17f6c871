//! Wire access to the `/tree` resource

use async_trait::async_trait;
use serde_json::json;

use crate::client::error::TransportError;
use crate::http::{MessageResponse, TREE_PATH};
use crate::models::{from_json_slice, TreeDocument, TreeNode};

/// The three requests the sync client makes
#[async_trait]
pub trait TreeTransport: Send + Sync {
    /// `GET /tree`
    async fn fetch_trees(&self) -> Result<Vec<TreeDocument>, TransportError>;

    /// `POST /tree` with `{"parentName": ..., "child": ...}`
    async fn add_child(&self, parent_name: &str, child: &TreeNode) -> Result<(), TransportError>;

    /// `PUT /tree` with `{"tree": ...}`
    async fn replace_tree(&self, tree: &TreeNode) -> Result<(), TransportError>;
}

/// `TreeTransport` over HTTP with JSON bodies
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    tree_url: String,
}

impl HttpTransport {
    /// Transport for the server at `base_url` (e.g. `http://127.0.0.1:3001`)
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl AsRef<str>) -> Self {
        let tree_url = format!("{}{}", base_url.as_ref().trim_end_matches('/'), TREE_PATH);
        Self { client, tree_url }
    }

    pub fn tree_url(&self) -> &str {
        &self.tree_url
    }

    /// Pass 2xx responses through; turn anything else into `TransportError::Status`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.json::<MessageResponse>().await {
            Ok(body) => body.message,
            Err(_) => status.canonical_reason().unwrap_or("Unknown error").to_string(),
        };
        Err(TransportError::status(status.as_u16(), message))
    }
}

#[async_trait]
impl TreeTransport for HttpTransport {
    async fn fetch_trees(&self) -> Result<Vec<TreeDocument>, TransportError> {
        let response = Self::check(self.client.get(&self.tree_url).send().await?).await?;
        let bytes = response.bytes().await?;
        from_json_slice(&bytes).map_err(|e| TransportError::decode(e.to_string()))
    }

    async fn add_child(&self, parent_name: &str, child: &TreeNode) -> Result<(), TransportError> {
        let body = json!({ "parentName": parent_name, "child": child });
        let response = self.client.post(&self.tree_url).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn replace_tree(&self, tree: &TreeNode) -> Result<(), TransportError> {
        let body = json!({ "tree": tree });
        let response = self.client.put(&self.tree_url).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}
