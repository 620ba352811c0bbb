//! Workspace server settings: SSH key provisioning and the install location.
//!
//! Thin request wrappers. Every failure propagates to the caller.

use crate::error::SyncError;
use crate::transport::{endpoints, Transport, TransportRequest};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Keys a server may use for the install path in its response.
const INSTALL_PATH_KEYS: [&str; 3] = ["installPath", "sourcePath", "path"];

/// Pull the install path out of a `get-install-path` response.
///
/// Accepts a bare string, or one of the known keys at the top level or under
/// `data`.
pub fn install_path_from(payload: &Value) -> Option<String> {
    if let Some(path) = payload.as_str() {
        return Some(path.to_string());
    }
    let lookup = |scope: &Value| {
        INSTALL_PATH_KEYS
            .iter()
            .find_map(|key| scope.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    };
    lookup(payload).or_else(|| {
        let data = payload.get("data")?;
        data.as_str().map(str::to_string).or_else(|| lookup(data))
    })
}

pub struct SettingsClient {
    transport: Arc<dyn Transport>,
}

impl SettingsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Have the server generate an SSH key pair for `email`.
    #[instrument(skip(self))]
    pub async fn generate_ssh_key(&self, email: &str) -> Result<Value, SyncError> {
        let payload = self
            .transport
            .send(TransportRequest::post_json(
                endpoints::SSH_GENERATE_KEY,
                json!({ "email": email }),
            ))
            .await?;
        info!("ssh key generated");
        Ok(payload)
    }

    #[instrument(skip(self))]
    pub async fn submit_email(&self, email: &str) -> Result<Value, SyncError> {
        let payload = self
            .transport
            .send(TransportRequest::post_json(
                endpoints::SSH_SUBMIT_EMAIL,
                json!({ "email": email }),
            ))
            .await?;
        Ok(payload)
    }

    /// Point the server's install location at `source_path`.
    #[instrument(skip(self))]
    pub async fn update_install_path(&self, source_path: &str) -> Result<Value, SyncError> {
        let payload = self
            .transport
            .send(TransportRequest::post_json(
                endpoints::INIT_INSTALL_PATH,
                json!({ "sourcePath": source_path }),
            ))
            .await?;
        info!("install path updated");
        Ok(payload)
    }

    #[instrument(skip(self))]
    pub async fn get_install_path(&self) -> Result<Value, SyncError> {
        let payload = self
            .transport
            .send(TransportRequest::get(endpoints::GET_INSTALL_PATH))
            .await?;
        Ok(payload)
    }
}
