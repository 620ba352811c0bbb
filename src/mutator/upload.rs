//! Upload jobs for the upload-commit-push pipeline.

use crate::error::SyncError;
use crate::progress::{ProgressReporter, ProgressSink};
use crate::transport::UploadForm;
use crate::tree::path::WorkspacePath;
use std::path::PathBuf;

/// Where the uploaded bytes come from.
#[derive(Debug, Clone)]
pub enum UploadSource {
    File(PathBuf),
    Bytes { file_name: String, content: Vec<u8> },
}

impl UploadSource {
    /// Name sent with the multipart file part.
    pub fn file_name(&self) -> Result<String, SyncError> {
        match self {
            UploadSource::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| {
                    SyncError::InvalidUpload(format!("{} has no file name", path.display()))
                }),
            UploadSource::Bytes { file_name, .. } if file_name.is_empty() => Err(
                SyncError::InvalidUpload("in-memory upload has an empty file name".to_string()),
            ),
            UploadSource::Bytes { file_name, .. } => Ok(file_name.clone()),
        }
    }

    async fn load(self) -> Result<Vec<u8>, SyncError> {
        match self {
            UploadSource::File(path) => tokio::fs::read(&path)
                .await
                .map_err(|source| SyncError::Io { path, source }),
            UploadSource::Bytes { content, .. } => Ok(content),
        }
    }
}

/// One upload-and-push request. Consumed by the upload call.
pub struct UploadJob {
    pub source: UploadSource,
    pub target: WorkspacePath,
    progress: Option<ProgressSink>,
}

impl UploadJob {
    pub fn new(source: UploadSource, target: WorkspacePath) -> Self {
        Self {
            source,
            target,
            progress: None,
        }
    }

    pub fn from_file(path: impl Into<PathBuf>, target: WorkspacePath) -> Self {
        Self::new(UploadSource::File(path.into()), target)
    }

    pub fn from_bytes(
        file_name: impl Into<String>,
        content: Vec<u8>,
        target: WorkspacePath,
    ) -> Self {
        Self::new(
            UploadSource::Bytes {
                file_name: file_name.into(),
                content,
            },
            target,
        )
    }

    /// Receive upload progress as a percentage in `[0, 100]`.
    pub fn on_progress(mut self, sink: impl FnMut(u8) + Send + 'static) -> Self {
        self.progress = Some(Box::new(sink));
        self
    }

    /// Read the source and build the multipart form.
    pub(crate) async fn into_form(self) -> Result<UploadForm, SyncError> {
        let file_name = self.source.file_name()?;
        let content = self.source.load().await?;
        Ok(UploadForm {
            progress: ProgressReporter::new(file_name.clone(), self.progress),
            file_name,
            content,
            target_relative_path: self.target.relative_dir().to_string(),
        })
    }
}

impl std::fmt::Debug for UploadJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadJob")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("has_progress_sink", &self.progress.is_some())
            .finish()
    }
}
