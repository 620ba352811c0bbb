//! Workspace Tree
//!
//! Represents the remote workspace as a tree of named files and directories,
//! plus the cache that holds the last-known tree and its health.

pub mod cache;
pub mod fallback;
pub mod node;
pub mod path;

pub use cache::{SyncHealth, TreeCache, TreeSnapshot};
pub use fallback::DefaultWorkspaceTree;
pub use node::{EntryKind, Tree, TreeCounts, TreeEntry, TreeNode, TreeParseError};
pub use path::{normalize_target_path, normalize_workspace_scope, WorkspacePath, ROOT_SENTINEL};
