//! `/tree` Endpoint Tests
//!
//! Drives the full router (CORS, tracing and panic layers included) with
//! `tower::ServiceExt::oneshot` over an in-memory store.

#[cfg(test)]
mod tree_endpoints_tests {
    use anyhow::Result;
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;
    use treesync_core::db::{InMemoryTreeStore, TreeStore};
    use treesync_core::http::{create_router, AppState};
    use treesync_core::models::{from_json_slice, TreeDocument, TreeNode};
    use treesync_core::services::TreeService;

    fn test_app(trees: Vec<TreeNode>) -> (Router, Arc<InMemoryTreeStore>) {
        let store = Arc::new(InMemoryTreeStore::with_trees(trees));
        let service = TreeService::with_store(store.clone());
        (create_router(AppState::new(service), None), store)
    }

    async fn send(app: &Router, method: Method, body: Option<&str>) -> Result<(StatusCode, Value)> {
        let request = Request::builder()
            .method(method)
            .uri("/tree")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))?;

        let response = app.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            from_json_slice(&bytes)?
        };
        Ok((status, value))
    }

    async fn send_json(app: &Router, method: Method, body: Value) -> Result<(StatusCode, Value)> {
        send(app, method, Some(&body.to_string())).await
    }

    #[tokio::test]
    async fn test_get_creates_default_root_once() -> Result<()> {
        let (app, store) = test_app(vec![]);

        let (status, first) = send(&app, Method::GET, None).await?;
        assert_eq!(status, StatusCode::OK);
        let docs = first.as_array().expect("array body");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "root");
        assert_eq!(docs[0]["children"], json!([]));
        assert!(docs[0]["_id"].is_string());

        let (_, second) = send(&app, Method::GET, None).await?;
        assert_eq!(second, first);
        assert_eq!(store.find_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_post_adds_child() -> Result<()> {
        let (app, store) = test_app(vec![TreeNode::root()]);

        let (status, body) = send_json(
            &app,
            Method::POST,
            json!({"parentName": "root", "child": {"name": "root-c1", "data": "Data"}}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Child node added successfully"}));

        let stored = store.find_by_name("root").await?.expect("root stored");
        assert_eq!(stored.children(), &[TreeNode::leaf("root-c1", "Data")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_post_under_data_node_drops_data() -> Result<()> {
        let tree = TreeNode::root().with_child(TreeNode::leaf("root-c1", "Data"));
        let (app, store) = test_app(vec![tree]);

        let (status, _) = send_json(
            &app,
            Method::POST,
            json!({"parentName": "root-c1", "child": {"name": "root-c1-c1", "data": "Data"}}),
        )
        .await?;
        assert_eq!(status, StatusCode::OK);

        let stored = store.find_by_name("root").await?.expect("root stored");
        let parent = stored.find("root-c1").expect("parent kept");
        assert_eq!(parent.data, None);
        assert_eq!(parent.children(), &[TreeNode::leaf("root-c1-c1", "Data")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_post_rejects_missing_fields() -> Result<()> {
        let (app, _store) = test_app(vec![TreeNode::root()]);

        let bodies = [
            Some(r#"{"parentName": "root"}"#),
            Some(r#"{"child": {"name": "x"}}"#),
            Some(r#"{"parentName": "", "child": {"name": "x"}}"#),
            Some("not json"),
            None,
        ];

        for body in bodies {
            let (status, value) = send(&app, Method::POST, body).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {:?}", body);
            assert_eq!(value, json!({"message": "Invalid data"}));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_post_without_root_tree() -> Result<()> {
        let (app, _store) = test_app(vec![TreeNode::new("other")]);

        let (status, body) = send_json(
            &app,
            Method::POST,
            json!({"parentName": "root", "child": {"name": "root-c1"}}),
        )
        .await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Tree not found"}));
        Ok(())
    }

    #[tokio::test]
    async fn test_post_unknown_parent() -> Result<()> {
        let (app, store) = test_app(vec![TreeNode::root()]);

        let (status, body) = send_json(
            &app,
            Method::POST,
            json!({"parentName": "ghost", "child": {"name": "ghost-c1"}}),
        )
        .await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Parent node not found"}));
        assert_eq!(store.find_by_name("root").await?, Some(TreeNode::root()));
        Ok(())
    }

    #[tokio::test]
    async fn test_put_replaces_and_strips_internal_id() -> Result<()> {
        let (app, _store) = test_app(vec![]);

        let (_, docs) = send(&app, Method::GET, None).await?;
        let mut tree = docs[0].clone();
        tree["children"] = json!([{"name": "renamed", "data": "edited"}]);

        let (status, body) = send_json(&app, Method::PUT, json!({ "tree": tree })).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Tree hierarchy updated successfully"}));

        let (_, after) = send(&app, Method::GET, None).await?;
        let after = after.as_array().expect("array body");
        assert_eq!(after.len(), 1);
        assert_eq!(after[0]["_id"], docs[0]["_id"]);
        assert_eq!(after[0]["children"], json!([{"name": "renamed", "data": "edited"}]));
        Ok(())
    }

    #[tokio::test]
    async fn test_put_inserts_unknown_tree() -> Result<()> {
        let (app, store) = test_app(vec![TreeNode::root()]);

        let (status, _) =
            send_json(&app, Method::PUT, json!({"tree": {"name": "second", "data": "x"}})).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.find_all().await?.len(), 2);
        assert_eq!(
            store.find_by_name("second").await?,
            Some(TreeNode::leaf("second", "x"))
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_put_validation() -> Result<()> {
        let (app, _store) = test_app(vec![TreeNode::root()]);

        let cases = [
            (json!({}), "Invalid tree data provided"),
            (json!({"tree": "root"}), "Invalid tree data provided"),
            (json!({"tree": {"children": []}}), "Tree name is required to update"),
        ];

        for (body, message) in cases {
            let (status, value) = send_json(&app, Method::PUT, body).await?;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(value, json!({ "message": message }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_other_methods_not_allowed() -> Result<()> {
        let (app, _store) = test_app(vec![TreeNode::root()]);

        for method in [Method::DELETE, Method::PATCH] {
            let request = Request::builder()
                .method(method.clone())
                .uri("/tree")
                .body(Body::empty())?;
            let response = app.clone().oneshot(request).await?;

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(
                response.headers().get(header::ALLOW).map(|v| v.to_str().unwrap()),
                Some("GET, POST, PUT")
            );

            let bytes = response.into_body().collect().await?.to_bytes();
            let body: Value = serde_json::from_slice(&bytes)?;
            assert_eq!(body, json!({ "message": format!("Method {} not allowed", method) }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_head_not_allowed() -> Result<()> {
        let (app, _store) = test_app(vec![TreeNode::root()]);

        let request = Request::builder()
            .method(Method::HEAD)
            .uri("/tree")
            .body(Body::empty())?;
        let response = app.oneshot(request).await?;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).map(|v| v.to_str().unwrap()),
            Some("GET, POST, PUT")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_put_then_get_deep_tree() -> Result<()> {
        let (app, store) = test_app(vec![]);

        let mut tree = TreeNode::leaf("n100", "Data");
        for level in (1..100).rev() {
            tree = TreeNode::new(format!("n{}", level)).with_child(tree);
        }
        let tree = TreeNode::root().with_child(tree);

        let (status, _) = send_json(&app, Method::PUT, json!({ "tree": tree })).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(store.find_by_name("root").await?, Some(tree.clone()));

        let (status, body) = send(&app, Method::GET, None).await?;
        assert_eq!(status, StatusCode::OK);
        let docs: Vec<TreeDocument> = from_json_slice(body.to_string().as_bytes())?;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].tree, tree);
        Ok(())
    }
}
