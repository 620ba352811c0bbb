//! Shared test utilities for integration tests
//!
//! [`MockTransport`] stands in for the workspace server: it records every
//! request, answers from per-endpoint scripts, and can hold a reply until the
//! test releases it, for exercising out-of-order completion.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Notify;
use treesync::config::SyncPolicyConfig;
use treesync::transport::{HttpMethod, RequestBody, Transport, TransportRequest};
use treesync::tree::DefaultWorkspaceTree;
use treesync::{SyncOrchestrator, TransportError};

/// Scripted server answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, String),
    Network(String),
    Malformed(String),
}

impl Reply {
    fn into_result(self) -> Result<Value, TransportError> {
        match self {
            Reply::Json(v) => Ok(v),
            Reply::Status(status, detail) => Err(TransportError::Status { status, detail }),
            Reply::Network(detail) => Err(TransportError::Network(detail)),
            Reply::Malformed(detail) => Err(TransportError::Malformed(detail)),
        }
    }
}

/// Releases a held reply.
#[derive(Debug, Clone, Default)]
pub struct Gate(Arc<Notify>);

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&self) {
        self.0.notify_one();
    }

    async fn wait(&self) {
        self.0.notified().await;
    }
}

struct Step {
    reply: Reply,
    gate: Option<Gate>,
}

/// What an upload request carried, minus the reporter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUpload {
    pub file_name: String,
    pub content: Vec<u8>,
    pub target_relative_path: String,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: &'static str,
    pub json: Option<Value>,
    pub upload: Option<RecordedUpload>,
}

#[derive(Default)]
struct MockState {
    scripts: HashMap<&'static str, VecDeque<Step>>,
    defaults: HashMap<&'static str, Reply>,
    requests: Vec<RecordedRequest>,
    upload_ticks: Option<Vec<(u64, u64)>>,
    reported: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every request to `path` with `reply` once its script runs out.
    pub fn always(&self, path: &'static str, reply: Reply) -> &Self {
        self.state.lock().defaults.insert(path, reply);
        self
    }

    /// Queue one reply for the next request to `path`.
    pub fn push(&self, path: &'static str, reply: Reply) -> &Self {
        self.push_step(path, reply, None)
    }

    /// Queue one reply that is held until `gate` opens.
    pub fn push_gated(&self, path: &'static str, reply: Reply, gate: &Gate) -> &Self {
        self.push_step(path, reply, Some(gate.clone()))
    }

    fn push_step(&self, path: &'static str, reply: Reply, gate: Option<Gate>) -> &Self {
        self.state
            .lock()
            .scripts
            .entry(path)
            .or_default()
            .push_back(Step { reply, gate });
        self
    }

    /// Progress ticks `(loaded, total)` reported for each multipart upload.
    /// Without this, a single `(len, len)` tick is reported.
    pub fn with_upload_ticks(&self, ticks: Vec<(u64, u64)>) -> &Self {
        self.state.lock().upload_ticks = Some(ticks);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn count(&self, path: &str) -> usize {
        self.requests_to(path).len()
    }

    /// Percentages returned by the reporter for every simulated tick.
    pub fn reported_percents(&self) -> Vec<u8> {
        self.state.lock().reported.clone()
    }

    pub fn into_transport(self) -> Arc<dyn Transport> {
        Arc::new(self)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError> {
        let TransportRequest { method, path, body } = request;
        let (json, upload) = match body {
            RequestBody::Empty => (None, None),
            RequestBody::Json(v) => (Some(v), None),
            RequestBody::Multipart(form) => {
                let ticks = self
                    .state
                    .lock()
                    .upload_ticks
                    .clone()
                    .unwrap_or_else(|| vec![(form.total_bytes(), form.total_bytes())]);
                for (loaded, total) in ticks {
                    let percent = form.progress.report(loaded, total);
                    self.state.lock().reported.push(percent);
                }
                let upload = RecordedUpload {
                    file_name: form.file_name,
                    content: form.content,
                    target_relative_path: form.target_relative_path,
                };
                (None, Some(upload))
            }
        };

        let step = {
            let mut state = self.state.lock();
            state.requests.push(RecordedRequest {
                method,
                path,
                json,
                upload,
            });
            match state.scripts.get_mut(path).and_then(VecDeque::pop_front) {
                Some(step) => step,
                None => Step {
                    reply: state
                        .defaults
                        .get(path)
                        .cloned()
                        .unwrap_or_else(|| Reply::Json(json!({ "success": true }))),
                    gate: None,
                },
            }
        };

        if let Some(gate) = step.gate {
            gate.wait().await;
        }
        step.reply.into_result()
    }

    fn base_url(&self) -> &str {
        "mock://workspace"
    }
}

/// A successful `/git-tree` response wrapping `root`.
pub fn tree_response(root: Value) -> Reply {
    Reply::Json(json!({
        "success": true,
        "message": "file tree loaded",
        "data": { "root": root }
    }))
}

pub fn sample_root() -> Value {
    json!({
        "README.md": {},
        "docs": { "guide.md": {}, "api": { "index.md": {} } },
        "src": { "main.js": {} }
    })
}

/// Policy with both guards on, as shipped.
pub fn default_policy() -> SyncPolicyConfig {
    SyncPolicyConfig::default()
}

pub fn orchestrator_with(mock: &MockTransport, policy: SyncPolicyConfig) -> SyncOrchestrator {
    SyncOrchestrator::new(
        mock.clone().into_transport(),
        DefaultWorkspaceTree::builtin(),
        policy,
    )
}
