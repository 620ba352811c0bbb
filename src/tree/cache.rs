//! Tree cache: last-known workspace tree plus its health.
//!
//! `fetch_tree` never fails. Any transport or decoding failure substitutes the
//! injected fallback tree and marks the snapshot [`SyncHealth::Degraded`].
//! Snapshots are replaced wholesale; a fetch that started earlier never
//! overwrites one that started later.

use crate::error::TransportError;
use crate::transport::{endpoints, Transport, TransportRequest};
use crate::tree::fallback::DefaultWorkspaceTree;
use crate::tree::node::{Tree, TreeParseError};
use crate::tree::path::WorkspacePath;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncHealth {
    Live,
    Degraded,
}

impl SyncHealth {
    pub fn as_str(self) -> &'static str {
        match self {
            SyncHealth::Live => "live",
            SyncHealth::Degraded => "degraded",
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, SyncHealth::Live)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeSnapshot {
    pub tree: Tree,
    pub health: SyncHealth,
    /// Server message on success, fallback message when degraded.
    pub message: Option<String>,
}

/// Why a fetch fell back. Only logged, never returned.
#[derive(Debug, Error)]
enum FetchFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server reported failure: {0}")]
    Rejected(String),

    #[error("unexpected tree envelope: {0}")]
    Envelope(String),

    #[error(transparent)]
    Tree(#[from] TreeParseError),
}

#[derive(Deserialize)]
struct TreeEnvelope {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    data: TreeData,
}

#[derive(Deserialize)]
struct TreeData {
    root: Value,
}

struct Installed {
    ticket: u64,
    snapshot: Arc<TreeSnapshot>,
}

pub struct TreeCache {
    transport: Arc<dyn Transport>,
    fallback: DefaultWorkspaceTree,
    tickets: AtomicU64,
    current: RwLock<Option<Installed>>,
}

impl TreeCache {
    pub fn new(transport: Arc<dyn Transport>, fallback: DefaultWorkspaceTree) -> Self {
        Self {
            transport,
            fallback,
            tickets: AtomicU64::new(0),
            current: RwLock::new(None),
        }
    }

    pub fn fallback(&self) -> &DefaultWorkspaceTree {
        &self.fallback
    }

    /// Fetch the live tree, or the fallback tree when anything goes wrong.
    #[instrument(skip(self), fields(base_url = self.transport.base_url()))]
    pub async fn fetch_tree(&self) -> TreeSnapshot {
        match self.fetch_live().await {
            Ok(snapshot) => {
                debug!(
                    files = snapshot.tree.counts().files,
                    "fetched live workspace tree"
                );
                snapshot
            }
            Err(cause) => {
                warn!(error = %cause, "tree fetch failed, serving fallback tree");
                self.degraded()
            }
        }
    }

    async fn fetch_live(&self) -> Result<TreeSnapshot, FetchFailure> {
        let body = self
            .transport
            .send(TransportRequest::get(endpoints::GIT_TREE))
            .await?;
        let envelope: TreeEnvelope =
            serde_json::from_value(body).map_err(|e| FetchFailure::Envelope(e.to_string()))?;
        if envelope.success == Some(false) {
            return Err(FetchFailure::Rejected(
                envelope.message.unwrap_or_else(|| "no message".to_string()),
            ));
        }
        let tree = Tree::from_value(&envelope.data.root)?;
        Ok(TreeSnapshot {
            tree,
            health: SyncHealth::Live,
            message: envelope.message,
        })
    }

    fn degraded(&self) -> TreeSnapshot {
        TreeSnapshot {
            tree: self.fallback.tree().clone(),
            health: SyncHealth::Degraded,
            message: Some(self.fallback.message().to_string()),
        }
    }

    /// Fetch and install. Returns whichever snapshot is current afterwards.
    pub async fn refresh(&self) -> Arc<TreeSnapshot> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let snapshot = Arc::new(self.fetch_tree().await);
        self.install(ticket, snapshot)
    }

    fn install(&self, ticket: u64, snapshot: Arc<TreeSnapshot>) -> Arc<TreeSnapshot> {
        let mut current = self.current.write();
        match current.as_ref() {
            Some(installed) if installed.ticket > ticket => {
                info!(
                    ticket,
                    installed = installed.ticket,
                    "discarding tree fetch overtaken by a newer one"
                );
                Arc::clone(&installed.snapshot)
            }
            _ => {
                *current = Some(Installed {
                    ticket,
                    snapshot: Arc::clone(&snapshot),
                });
                snapshot
            }
        }
    }

    pub fn current(&self) -> Option<Arc<TreeSnapshot>> {
        self.current
            .read()
            .as_ref()
            .map(|installed| Arc::clone(&installed.snapshot))
    }

    pub fn health(&self) -> Option<SyncHealth> {
        self.current.read().as_ref().map(|i| i.snapshot.health)
    }

    /// Add a folder to the cached tree after a confirmed create.
    ///
    /// Only live snapshots are touched; the fallback tree stays as shipped.
    /// The next refresh reconciles it against the server.
    pub fn apply_created_folder(&self, parent: &WorkspacePath, name: &str) -> bool {
        let mut current = self.current.write();
        let Some(installed) = current.as_mut() else {
            return false;
        };
        if !installed.snapshot.health.is_live() {
            debug!(folder = name, "skipping optimistic insert into fallback tree");
            return false;
        }
        let snapshot = Arc::make_mut(&mut installed.snapshot);
        snapshot.tree.insert_directory(parent, name)
    }
}

impl std::fmt::Debug for TreeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeCache")
            .field("base_url", &self.transport.base_url())
            .field("health", &self.health())
            .finish()
    }
}
