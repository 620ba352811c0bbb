//! Sparse Navigator
//!
//! Maps a navigation path to a sparse-pull request against the workspace
//! server. Pulling the same scope twice is safe; the server decides what, if
//! anything, needs materializing.

use crate::error::SyncError;
use crate::transport::{endpoints, Transport, TransportRequest};
use crate::tree::path::WorkspacePath;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Flags a server may use to report whether new files were materialized.
const MATERIALIZATION_FLAGS: [&str; 3] = ["materialized", "updated", "changed"];

#[derive(Debug, Clone, PartialEq)]
pub struct SparsePullResult {
    /// Wire scope that was pulled (`""` for the workspace root).
    pub scope: String,
    /// Server response, passed through untouched.
    pub payload: Value,
    /// Whether the server reported new materialization work. Defaults to true
    /// when the response carries no recognizable flag.
    pub materialized: bool,
}

/// Read the materialization flag from a sparse-pull response.
///
/// Looks at the top level first, then under `data`. Returns `None` when no
/// known boolean flag is present.
pub fn materialization_flag(payload: &Value) -> Option<bool> {
    let lookup = |scope: &Value| {
        MATERIALIZATION_FLAGS
            .iter()
            .find_map(|flag| scope.get(*flag).and_then(Value::as_bool))
    };
    lookup(payload).or_else(|| payload.get("data").and_then(lookup))
}

pub struct SparseNavigator {
    transport: Arc<dyn Transport>,
}

impl SparseNavigator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Ask the server to materialize `path`. Transport failures propagate.
    #[instrument(skip(self, path), fields(scope = path.sparse_scope()))]
    pub async fn sparse_pull(&self, path: &WorkspacePath) -> Result<SparsePullResult, SyncError> {
        let scope = path.sparse_scope().to_string();
        let payload = self
            .transport
            .send(TransportRequest::post_json(
                endpoints::SPARSE_PULL,
                json!({ "workspace": scope }),
            ))
            .await?;

        let materialized = materialization_flag(&payload).unwrap_or(true);
        debug!(materialized, "sparse pull completed");
        Ok(SparsePullResult {
            scope,
            payload,
            materialized,
        })
    }
}
