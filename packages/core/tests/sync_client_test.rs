//! Sync Client Integration Tests
//!
//! Runs the sync client against the real router through an in-process transport, so
//! the client and server mutation paths are exercised together.

#[cfg(test)]
mod sync_client_tests {
    use anyhow::Result;
    use async_trait::async_trait;
    use axum::body::{Body, Bytes};
    use axum::http::{header, Method, Request};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::sync::broadcast;
    use tokio::time::{timeout, Duration};
    use tower::ServiceExt;
    use treesync_core::client::{SyncClient, SyncEvent, TransportError, TreeTransport};
    use treesync_core::db::{InMemoryTreeStore, TreeStore};
    use treesync_core::http::{create_router, AppState, MessageResponse};
    use treesync_core::models::{from_json_slice, NodePatch, TreeDocument, TreeNode};
    use treesync_core::services::TreeService;

    /// `TreeTransport` that calls the router directly instead of over a socket
    struct RouterTransport {
        app: Router,
    }

    impl RouterTransport {
        async fn call(&self, method: Method, body: Option<Value>) -> Result<Bytes, TransportError> {
            let body = body
                .map(|value| Body::from(value.to_string()))
                .unwrap_or_else(Body::empty);
            let request = Request::builder()
                .method(method)
                .uri("/tree")
                .header(header::CONTENT_TYPE, "application/json")
                .body(body)
                .map_err(|e| TransportError::decode(e.to_string()))?;

            // Router's error type is Infallible
            let response = self
                .app
                .clone()
                .oneshot(request)
                .await
                .map_err(|e| -> TransportError { match e {} })?;
            let status = response.status();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|e| TransportError::decode(e.to_string()))?
                .to_bytes();

            if !status.is_success() {
                let message = serde_json::from_slice::<MessageResponse>(&bytes)
                    .map(|body| body.message)
                    .unwrap_or_default();
                return Err(TransportError::status(status.as_u16(), message));
            }
            Ok(bytes)
        }
    }

    #[async_trait]
    impl TreeTransport for RouterTransport {
        async fn fetch_trees(&self) -> Result<Vec<TreeDocument>, TransportError> {
            let bytes = self.call(Method::GET, None).await?;
            from_json_slice(&bytes).map_err(|e| TransportError::decode(e.to_string()))
        }

        async fn add_child(
            &self,
            parent_name: &str,
            child: &TreeNode,
        ) -> Result<(), TransportError> {
            let body = json!({ "parentName": parent_name, "child": child });
            self.call(Method::POST, Some(body)).await.map(|_| ())
        }

        async fn replace_tree(&self, tree: &TreeNode) -> Result<(), TransportError> {
            self.call(Method::PUT, Some(json!({ "tree": tree })))
                .await
                .map(|_| ())
        }
    }

    fn test_server(trees: Vec<TreeNode>) -> (Arc<RouterTransport>, Arc<InMemoryTreeStore>) {
        let store = Arc::new(InMemoryTreeStore::with_trees(trees));
        let app = create_router(AppState::new(TreeService::with_store(store.clone())), None);
        (Arc::new(RouterTransport { app }), store)
    }

    async fn next_event(rx: &mut broadcast::Receiver<SyncEvent>) -> SyncEvent {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("Sync event should arrive within 2 seconds")
            .expect("Should receive event")
    }

    async fn expect_pushed(rx: &mut broadcast::Receiver<SyncEvent>, count: usize) {
        for _ in 0..count {
            match next_event(rx).await {
                SyncEvent::Pushed { .. } => {}
                other => panic!("Expected Pushed, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_load_from_empty_server_creates_root() -> Result<()> {
        let (transport, store) = test_server(vec![]);

        let client = SyncClient::load(transport).await?;
        assert_eq!(client.snapshot().as_ref(), &TreeNode::root());
        assert_eq!(store.find_by_name("root").await?, Some(TreeNode::root()));
        Ok(())
    }

    #[tokio::test]
    async fn test_client_and_server_converge() -> Result<()> {
        let (transport, store) = test_server(vec![TreeNode::root()]);
        let client = SyncClient::load(transport).await?;
        let mut events = client.subscribe();

        client.add_child("root")?;
        client.add_child("root")?;
        client.add_child("root-c1")?;
        client.update_node("root-c2", &NodePatch::new().with_data("c2 World"))?;
        expect_pushed(&mut events, 4).await;

        let stored = store.find_by_name("root").await?.expect("root stored");
        assert_eq!(&stored, client.snapshot().as_ref());

        let parent = stored.find("root-c1").expect("root-c1 stored");
        assert_eq!(parent.data, None);
        assert_eq!(parent.children(), &[TreeNode::leaf("root-c1-c1", "Data")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_rename_then_add_child_is_pushed_in_order() -> Result<()> {
        let (transport, store) = test_server(vec![TreeNode::root()]);
        let client = SyncClient::load(transport).await?;
        let mut events = client.subscribe();

        let child = client.add_child("root")?;
        client.update_node(&child.name, &NodePatch::new().with_name("renamed"))?;
        client.add_child("renamed")?;
        expect_pushed(&mut events, 3).await;

        let stored = store.find_by_name("root").await?.expect("root stored");
        assert!(stored.find("renamed-c1").is_some());
        assert_eq!(&stored, client.snapshot().as_ref());
        Ok(())
    }

    #[tokio::test]
    async fn test_rejected_push_keeps_local_change() -> Result<()> {
        // The server has no "root" document, so every add-child is a 404
        let (transport, store) = test_server(vec![TreeNode::new("other")]);
        let client = SyncClient::new(TreeNode::root(), transport);
        let mut events = client.subscribe();

        let child = client.add_child("root")?;

        match next_event(&mut events).await {
            SyncEvent::PushFailed { message, .. } => {
                assert!(message.contains("404"));
                assert!(message.contains("Tree not found"));
            }
            other => panic!("Expected PushFailed, got {:?}", other),
        }
        assert_eq!(client.snapshot().children(), &[child]);
        assert_eq!(store.find_by_name("root").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_name_collision_never_reaches_server() -> Result<()> {
        let tree = TreeNode::root()
            .with_child(TreeNode::leaf("a", "x"))
            .with_child(TreeNode::leaf("b", "y"));
        let (transport, store) = test_server(vec![tree.clone()]);
        let client = SyncClient::load(transport).await?;

        assert!(client
            .update_node("b", &NodePatch::new().with_name("a"))
            .is_err());

        tokio::task::yield_now().await;
        assert_eq!(store.find_by_name("root").await?, Some(tree));
        Ok(())
    }
}
