//! Configuration System
//!
//! Layered configuration for the workspace client: defaults, a global file,
//! workspace files, and environment overrides, assembled by [`ConfigLoader`].
//! Read once at startup.

use crate::error::SyncError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::env::{API_URL_VAR, ENV_PREFIX};
pub use sources::workspace_file::ENV_NAME_VAR;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";
pub const DEFAULT_UPLOAD_CHUNK_SIZE: usize = 64 * 1024;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub sync: SyncPolicyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Workspace server endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bytes per multipart chunk; one progress tick is reported per chunk
    #[serde(default = "default_upload_chunk_size")]
    pub upload_chunk_size: usize,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_upload_chunk_size() -> usize {
    DEFAULT_UPLOAD_CHUNK_SIZE
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            upload_chunk_size: default_upload_chunk_size(),
        }
    }
}

/// Orchestrator policy knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPolicyConfig {
    /// Re-fetch the tree after every successful mutation
    #[serde(default = "default_true")]
    pub refresh_after_mutation: bool,

    /// Reject mutations on a path that overlaps one already in flight
    #[serde(default = "default_true")]
    pub guard_concurrent_mutations: bool,

    /// JSON file replacing the built-in degraded-mode tree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_tree: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for SyncPolicyConfig {
    fn default() -> Self {
        Self {
            refresh_after_mutation: true,
            guard_concurrent_mutations: true,
            fallback_tree: None,
        }
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), String> {
        let url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid base URL '{}': {}", self.base_url, e))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(format!(
                "Base URL must use http or https, got '{}'",
                url.scheme()
            ));
        }
        if self.upload_chunk_size == 0 {
            return Err("Upload chunk size must be positive".to_string());
        }
        Ok(())
    }
}

impl SyncConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), SyncError> {
        self.api.validate().map_err(SyncError::Config)?;
        if let Some(path) = &self.sync.fallback_tree {
            if path.as_os_str().is_empty() {
                return Err(SyncError::Config(
                    "Fallback tree path cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Render as TOML, as shown by `treesync config show`.
    pub fn to_toml(&self) -> Result<String, SyncError> {
        toml::to_string_pretty(self).map_err(|e| SyncError::Config(e.to_string()))
    }
}
