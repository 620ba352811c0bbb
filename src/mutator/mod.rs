//! Workspace Mutator
//!
//! Upload-and-push, folder creation, deletion, and export to the install
//! location. Each operation is exactly one server round trip. Failures are
//! returned unchanged: there are no retries and no substituted values.

mod upload;

pub use upload::{UploadJob, UploadSource};

use crate::error::SyncError;
use crate::transport::{endpoints, Transport, TransportRequest};
use crate::tree::path::WorkspacePath;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Opaque server acknowledgment, passed through verbatim.
pub type ServerPayload = Value;

/// Outcome of a single mutation, owned by the caller that issued it.
pub type MutationResult = Result<ServerPayload, SyncError>;

/// A mutation intent, dispatched by the orchestrator.
#[derive(Debug)]
pub enum MutationOp {
    Upload(UploadJob),
    CreateFolder {
        base_dir: WorkspacePath,
        folder_name: String,
    },
    Delete {
        path: WorkspacePath,
    },
    Export {
        source: WorkspacePath,
    },
}

impl MutationOp {
    pub fn name(&self) -> &'static str {
        match self {
            MutationOp::Upload(_) => "upload",
            MutationOp::CreateFolder { .. } => "create_folder",
            MutationOp::Delete { .. } => "delete",
            MutationOp::Export { .. } => "export",
        }
    }

    /// Workspace location the mutation touches.
    pub fn affected_path(&self) -> WorkspacePath {
        match self {
            MutationOp::Upload(job) => job.target.clone(),
            MutationOp::CreateFolder {
                base_dir,
                folder_name,
            } => base_dir.join(folder_name),
            MutationOp::Delete { path } => path.clone(),
            MutationOp::Export { source } => source.clone(),
        }
    }
}

pub struct WorkspaceMutator {
    transport: Arc<dyn Transport>,
}

impl WorkspaceMutator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Upload a file, then have the server commit and push it.
    #[instrument(skip(self, job), fields(target_dir = job.target.relative_dir()))]
    pub async fn upload_and_push(&self, job: UploadJob) -> MutationResult {
        let form = job.into_form().await?;
        info!(
            file = %form.file_name,
            bytes = form.total_bytes(),
            "uploading file"
        );
        let payload = self
            .transport
            .send(TransportRequest::post_multipart(endpoints::UPLOAD_AND_PUSH, form))
            .await?;
        Ok(payload)
    }

    /// Create `folder_name` inside `base_dir`. The name is not validated
    /// locally; the server's verdict is returned as-is.
    #[instrument(skip(self, base_dir), fields(base_dir = base_dir.relative_dir()))]
    pub async fn create_folder(&self, base_dir: &WorkspacePath, folder_name: &str) -> MutationResult {
        let payload = self
            .transport
            .send(TransportRequest::post_json(
                endpoints::CREATE_FOLDER,
                json!({
                    "baseDir": base_dir.relative_dir(),
                    "folderName": folder_name,
                }),
            ))
            .await?;
        Ok(payload)
    }

    /// Delete a file or folder. Irreversible on the server side.
    #[instrument(skip(self, path), fields(path = path.target_path()))]
    pub async fn delete_file_or_folder(&self, path: &WorkspacePath) -> MutationResult {
        let payload = self
            .transport
            .send(TransportRequest::delete_json(
                endpoints::DELETE,
                json!({ "path": path.target_path() }),
            ))
            .await?;
        Ok(payload)
    }

    /// Copy a subtree into the server-resident install location.
    #[instrument(skip(self, source), fields(source = source.target_path()))]
    pub async fn download_file_or_folder(&self, source: &WorkspacePath) -> MutationResult {
        let payload = self
            .transport
            .send(TransportRequest::post_json(
                endpoints::COPY_TO_INSTALL,
                json!({ "sourcePath": source.target_path() }),
            ))
            .await?;
        Ok(payload)
    }

    pub async fn apply(&self, op: MutationOp) -> MutationResult {
        match op {
            MutationOp::Upload(job) => self.upload_and_push(job).await,
            MutationOp::CreateFolder {
                base_dir,
                folder_name,
            } => self.create_folder(&base_dir, &folder_name).await,
            MutationOp::Delete { path } => self.delete_file_or_folder(&path).await,
            MutationOp::Export { source } => self.download_file_or_folder(&source).await,
        }
    }
}
