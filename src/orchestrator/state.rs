//! Operation lifecycle and orchestrator result types.

use crate::mutator::ServerPayload;
use crate::tree::{SyncHealth, TreeEntry, TreeSnapshot, WorkspacePath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-call state: `Idle -> Pending -> {Applied, Failed}`. Stale navigations
/// end in `Superseded` instead of `Applied`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpState {
    Idle,
    Pending,
    Applied,
    Failed,
    Superseded,
}

impl OpState {
    pub fn as_str(self) -> &'static str {
        match self {
            OpState::Idle => "idle",
            OpState::Pending => "pending",
            OpState::Applied => "applied",
            OpState::Failed => "failed",
            OpState::Superseded => "superseded",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OpState::Applied | OpState::Failed | OpState::Superseded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Navigate,
    Refresh,
    Upload,
    CreateFolder,
    Delete,
    Export,
}

/// State transition delivered to an [`OperationObserver`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEvent {
    /// Monotonic id of the call the transition belongs to.
    pub operation: u64,
    pub kind: OperationKind,
    pub path: String,
    pub state: OpState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub type OperationObserver = Box<dyn Fn(&OperationEvent) + Send + Sync>;

/// Directory listing built from the cached tree.
#[derive(Debug, Clone)]
pub struct TreeView {
    pub path: WorkspacePath,
    /// `None` when the path is missing from the cached tree or is a file.
    pub entries: Option<Vec<TreeEntry>>,
    pub health: SyncHealth,
    pub snapshot: Arc<TreeSnapshot>,
}

impl TreeView {
    pub fn from_snapshot(path: WorkspacePath, snapshot: Arc<TreeSnapshot>) -> Self {
        Self {
            entries: snapshot.tree.entries(&path),
            health: snapshot.health,
            path,
            snapshot,
        }
    }
}

#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    Applied {
        view: TreeView,
        /// Whether this navigation triggered a tree refresh.
        refreshed: bool,
    },
    /// A newer navigation started before this one completed.
    Superseded { generation: u64, latest: u64 },
}

impl NavigationOutcome {
    pub fn view(&self) -> Option<&TreeView> {
        match self {
            NavigationOutcome::Applied { view, .. } => Some(view),
            NavigationOutcome::Superseded { .. } => None,
        }
    }
}

/// Successful mutation, with the tree health observed after the follow-up refresh.
#[derive(Debug, Clone)]
pub struct MutationReceipt {
    pub payload: ServerPayload,
    pub path: WorkspacePath,
    /// `None` when refresh-after-mutation is disabled and no tree is cached.
    pub health: Option<SyncHealth>,
}
