//! treesync: Client-side synchronization for sparse, git-backed workspaces
//!
//! Browses a remote workspace as a file tree, drives sparse checkouts as the
//! user navigates, and runs upload-commit-push, folder creation, deletion, and
//! export against the workspace server. When the tree cannot be fetched, a
//! local fallback tree is shown and flagged as degraded.

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod mutator;
pub mod navigator;
pub mod orchestrator;
pub mod progress;
pub mod settings;
pub mod transport;
pub mod tree;

pub use config::{ConfigLoader, SyncConfig};
pub use error::{SyncError, TransportError};
pub use mutator::{MutationOp, MutationResult, UploadJob, WorkspaceMutator};
pub use navigator::{SparseNavigator, SparsePullResult};
pub use orchestrator::{NavigationOutcome, OpState, SyncOrchestrator};
pub use transport::{HttpTransport, Transport};
pub use tree::{DefaultWorkspaceTree, SyncHealth, Tree, TreeCache, TreeSnapshot, WorkspacePath};
