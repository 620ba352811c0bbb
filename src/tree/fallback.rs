//! Fallback tree substituted when the live tree cannot be fetched.

use crate::config::SyncPolicyConfig;
use crate::error::SyncError;
use crate::tree::node::Tree;
use serde_json::{json, Value};
use std::path::Path;

/// Message attached to degraded snapshots built from the fallback tree.
pub const FALLBACK_MESSAGE: &str = "file tree loaded (local data)";

/// Tree shown while the server is unreachable.
///
/// Injected into the tree cache so tests and deployments can substitute
/// their own. [`DefaultWorkspaceTree::builtin`] is the stock sample workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultWorkspaceTree {
    tree: Tree,
    message: String,
}

impl DefaultWorkspaceTree {
    pub fn new(tree: Tree) -> Self {
        Self {
            tree,
            message: FALLBACK_MESSAGE.to_string(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Empty root directory.
    pub fn empty() -> Self {
        Self::new(Tree::default())
    }

    pub fn builtin() -> Self {
        match Tree::from_value(&builtin_root()) {
            Ok(tree) => Self::new(tree),
            Err(_) => Self::empty(),
        }
    }

    /// Parse a JSON fallback. Accepts either the bare root object or an
    /// object with a `root` key (optionally nested under `data`).
    pub fn from_json_str(raw: &str) -> Result<Self, SyncError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|e| SyncError::FallbackTree(format!("invalid JSON: {}", e)))?;
        let root = value
            .pointer("/data/root")
            .or_else(|| value.get("root"))
            .unwrap_or(&value);
        let tree = Tree::from_value(root).map_err(|e| SyncError::FallbackTree(e.to_string()))?;
        Ok(Self::new(tree))
    }

    pub fn from_file(path: &Path) -> Result<Self, SyncError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SyncError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// The fallback named by `sync.fallback_tree`, or the built-in one.
    pub fn from_policy(policy: &SyncPolicyConfig) -> Result<Self, SyncError> {
        match &policy.fallback_tree {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for DefaultWorkspaceTree {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_root() -> Value {
    json!({
        ".gitignore": {},
        "app.js": {},
        "config": {
            "gitConfig.js": {}
        },
        "controllers": {
            "gitController.js": {},
            "gitTreeController.js": {},
            "sshController.js": {}
        },
        "examples": {
            "useFileTreeIndex.js": {}
        },
        "package.json": {},
        "public": {
            "3333.txt": {},
            "hello.txt": {},
            "hello1.txt": {},
            "hello5.txt": {},
            "temp": {
                "gitee_id_rsa_1745845010860.pub": {},
                "id_ed25519_1745311729219.pub": {},
                "id_test_1745312938693.pub": {}
            },
            "this.txt": {}
        },
        "readme.md": {},
        "routes": {
            "git-tree.js": {},
            "git.js": {},
            "index.js": {},
            "ssh.js": {}
        },
        "utils": {
            "fileUtils.js": {},
            "gitTreeUtils.js": {},
            "gitUtils.js": {},
            "111.doc": {}
        }
    })
}
