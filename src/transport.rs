//! Transport Abstraction
//!
//! Every component that talks to the workspace server goes through the
//! [`Transport`] trait. The production implementation is
//! [`http::HttpTransport`]; tests substitute a scripted transport.

use crate::error::TransportError;
use crate::progress::ProgressReporter;
use async_trait::async_trait;
use serde_json::Value;

pub mod http;

pub use http::HttpTransport;

/// Server routes consumed by the client.
pub mod endpoints {
    pub const GIT_TREE: &str = "/git-tree";
    pub const SPARSE_PULL: &str = "/git/sparse-pull";
    pub const UPLOAD_AND_PUSH: &str = "/git/upload-and-push";
    pub const CREATE_FOLDER: &str = "/file/folder";
    pub const DELETE: &str = "/file/delete";
    pub const COPY_TO_INSTALL: &str = "/file/copy-to-install";
    pub const SSH_GENERATE_KEY: &str = "/ssh/generate-key";
    pub const SSH_SUBMIT_EMAIL: &str = "/ssh/submit-email";
    pub const INIT_INSTALL_PATH: &str = "/init/config/init-install-path";
    pub const GET_INSTALL_PATH: &str = "/init/config/get-install-path";
}

/// HTTP method subset used by the workspace API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// Multipart payload for upload-and-push.
#[derive(Debug)]
pub struct UploadForm {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Wire value for the `targetRelativePath` field.
    pub target_relative_path: String,
    pub progress: ProgressReporter,
}

impl UploadForm {
    pub fn total_bytes(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Multipart(UploadForm),
}

/// One request against the workspace server. `path` is relative to the base URL.
#[derive(Debug)]
pub struct TransportRequest {
    pub method: HttpMethod,
    pub path: &'static str,
    pub body: RequestBody,
}

impl TransportRequest {
    pub fn get(path: &'static str) -> Self {
        Self {
            method: HttpMethod::Get,
            path,
            body: RequestBody::Empty,
        }
    }

    pub fn post_json(path: &'static str, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
            body: RequestBody::Json(body),
        }
    }

    pub fn delete_json(path: &'static str, body: Value) -> Self {
        Self {
            method: HttpMethod::Delete,
            path,
            body: RequestBody::Json(body),
        }
    }

    pub fn post_multipart(path: &'static str, form: UploadForm) -> Self {
        Self {
            method: HttpMethod::Post,
            path,
            body: RequestBody::Multipart(form),
        }
    }

    /// JSON body, if the request carries one.
    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            RequestBody::Json(v) => Some(v),
            _ => None,
        }
    }
}

/// Workspace server transport.
///
/// Implementations return the decoded response body on 2xx. Non-2xx responses
/// become [`TransportError::Status`] carrying the raw body. For multipart
/// requests the implementation must call `form.progress.report` on every
/// upload tick.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<Value, TransportError>;

    /// Base URL requests are resolved against, for diagnostics.
    fn base_url(&self) -> &str;
}

/// Decode a 2xx response body: JSON when possible, raw text otherwise,
/// `Null` when empty.
pub fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
