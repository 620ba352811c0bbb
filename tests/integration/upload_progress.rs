//! Upload-and-push: multipart form contents and progress delivery.

use super::test_utils::{MockTransport, Reply};
use parking_lot::Mutex;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;
use treesync::transport::{endpoints, HttpMethod};
use treesync::{SyncError, UploadJob, WorkspaceMutator, WorkspacePath};

fn collector() -> (Arc<Mutex<Vec<u8>>>, impl FnMut(u8) + Send + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = {
        let seen = Arc::clone(&seen);
        move |percent| seen.lock().push(percent)
    };
    (seen, sink)
}

#[tokio::test]
async fn half_uploaded_reports_fifty() {
    let mock = MockTransport::new();
    mock.with_upload_ticks(vec![(500, 1000)]);
    let (seen, sink) = collector();

    let job = UploadJob::from_bytes("data.bin", vec![7u8; 1000], WorkspacePath::parse("/docs"))
        .on_progress(sink);
    WorkspaceMutator::new(mock.clone().into_transport())
        .upload_and_push(job)
        .await
        .unwrap();

    assert_eq!(*seen.lock(), vec![50]);
}

#[tokio::test]
async fn progress_is_monotone_and_bounded() {
    let mock = MockTransport::new();
    mock.with_upload_ticks(vec![
        (0, 1000),
        (333, 1000),
        (200, 1000),
        (999, 1000),
        (1500, 1000),
        (1000, 1000),
    ]);
    let (seen, sink) = collector();

    let job = UploadJob::from_bytes("a.txt", vec![0u8; 1000], WorkspacePath::root())
        .on_progress(sink);
    WorkspaceMutator::new(mock.clone().into_transport())
        .upload_and_push(job)
        .await
        .unwrap();

    let seen = seen.lock().clone();
    assert_eq!(seen, vec![0, 33, 33, 99, 100, 100]);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(mock.reported_percents(), seen);
}

#[tokio::test]
async fn multipart_form_carries_file_and_target() {
    let mock = MockTransport::new();
    mock.push(
        endpoints::UPLOAD_AND_PUSH,
        Reply::Json(json!({ "success": true, "message": "pushed" })),
    );

    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"hello workspace").unwrap();
    let file_name = file
        .path()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned();

    let payload = WorkspaceMutator::new(mock.clone().into_transport())
        .upload_and_push(UploadJob::from_file(file.path(), WorkspacePath::parse("root")))
        .await
        .unwrap();
    assert_eq!(payload["message"], json!("pushed"));

    let requests = mock.requests_to(endpoints::UPLOAD_AND_PUSH);
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].path, "/git/upload-and-push");
    let upload = requests[0].upload.as_ref().unwrap();
    assert_eq!(upload.file_name, file_name);
    assert_eq!(upload.content, b"hello workspace".to_vec());
    assert_eq!(upload.target_relative_path, "");
}

#[tokio::test]
async fn nested_target_is_sent_verbatim() {
    let mock = MockTransport::new();
    WorkspaceMutator::new(mock.clone().into_transport())
        .upload_and_push(UploadJob::from_bytes(
            "b.txt",
            b"x".to_vec(),
            WorkspacePath::parse("/docs/api"),
        ))
        .await
        .unwrap();
    let upload = mock.requests_to(endpoints::UPLOAD_AND_PUSH)[0]
        .upload
        .clone()
        .unwrap();
    assert_eq!(upload.target_relative_path, "/docs/api");
    assert_eq!(mock.reported_percents(), vec![100]);
}

#[tokio::test]
async fn empty_file_completes_at_hundred() {
    let mock = MockTransport::new();
    let (seen, sink) = collector();
    WorkspaceMutator::new(mock.clone().into_transport())
        .upload_and_push(
            UploadJob::from_bytes("empty.txt", Vec::new(), WorkspacePath::root()).on_progress(sink),
        )
        .await
        .unwrap();
    assert_eq!(*seen.lock(), vec![100]);
}

#[tokio::test]
async fn missing_local_file_fails_before_any_request() {
    let mock = MockTransport::new();
    let dir = tempfile::tempdir().unwrap();
    let err = WorkspaceMutator::new(mock.clone().into_transport())
        .upload_and_push(UploadJob::from_file(
            dir.path().join("absent.txt"),
            WorkspacePath::root(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::Io { .. }));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn server_rejection_after_upload_propagates() {
    let mock = MockTransport::new();
    mock.push(
        endpoints::UPLOAD_AND_PUSH,
        Reply::Status(500, r#"{"message":"push rejected"}"#.to_string()),
    );
    let (seen, sink) = collector();
    let err = WorkspaceMutator::new(mock.clone().into_transport())
        .upload_and_push(
            UploadJob::from_bytes("c.txt", vec![1; 10], WorkspacePath::root()).on_progress(sink),
        )
        .await
        .unwrap_err();
    assert_eq!(err.transport().and_then(|e| e.status()), Some(500));
    assert_eq!(*seen.lock(), vec![100], "bytes were sent before the rejection");
}
