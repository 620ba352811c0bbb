//! Sparse pull requests and error propagation.

use super::test_utils::{MockTransport, Reply};
use serde_json::json;
use treesync::transport::{endpoints, HttpMethod};
use treesync::{SparseNavigator, SyncError, TransportError, WorkspacePath};

fn navigator(mock: &MockTransport) -> SparseNavigator {
    SparseNavigator::new(mock.clone().into_transport())
}

#[tokio::test]
async fn root_sentinel_pulls_empty_scope() {
    let mock = MockTransport::new();
    let result = navigator(&mock)
        .sparse_pull(&WorkspacePath::parse("root"))
        .await
        .unwrap();

    assert_eq!(result.scope, "");
    let requests = mock.requests_to(endpoints::SPARSE_PULL);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].path, "/git/sparse-pull");
    assert_eq!(requests[0].json, Some(json!({ "workspace": "" })));
}

#[tokio::test]
async fn nested_path_is_sent_verbatim() {
    let mock = MockTransport::new();
    mock.push(
        endpoints::SPARSE_PULL,
        Reply::Json(json!({ "success": true, "data": { "updated": false } })),
    );
    let nav = navigator(&mock);

    let result = nav.sparse_pull(&WorkspacePath::parse("/docs")).await.unwrap();
    assert_eq!(result.scope, "/docs");
    assert!(!result.materialized);
    assert_eq!(result.payload["data"]["updated"], json!(false));

    nav.sparse_pull(&WorkspacePath::parse("docs/api/")).await.unwrap();
    let requests = mock.requests_to(endpoints::SPARSE_PULL);
    assert_eq!(requests[0].json, Some(json!({ "workspace": "/docs" })));
    assert_eq!(requests[1].json, Some(json!({ "workspace": "docs/api/" })));
}

#[tokio::test]
async fn missing_flag_counts_as_materialized() {
    let mock = MockTransport::new();
    mock.push(endpoints::SPARSE_PULL, Reply::Json(json!("pulled")));
    let result = navigator(&mock)
        .sparse_pull(&WorkspacePath::parse("/src"))
        .await
        .unwrap();
    assert!(result.materialized);
    assert_eq!(result.payload, json!("pulled"));
}

#[tokio::test]
async fn server_failure_propagates_with_detail() {
    let mock = MockTransport::new();
    mock.push(
        endpoints::SPARSE_PULL,
        Reply::Status(500, r#"{"success":false,"message":"sparse checkout failed"}"#.to_string()),
    );

    let err = navigator(&mock)
        .sparse_pull(&WorkspacePath::parse("/docs"))
        .await
        .unwrap_err();

    match &err {
        SyncError::Transport(TransportError::Status { status, .. }) => assert_eq!(*status, 500),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(
        err.transport().and_then(TransportError::server_message).as_deref(),
        Some("sparse checkout failed")
    );
}

#[tokio::test]
async fn repeated_pulls_are_each_sent() {
    let mock = MockTransport::new();
    let nav = navigator(&mock);
    let path = WorkspacePath::parse("/docs");
    nav.sparse_pull(&path).await.unwrap();
    nav.sparse_pull(&path).await.unwrap();
    assert_eq!(mock.count(endpoints::SPARSE_PULL), 2);
}
