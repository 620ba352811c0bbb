//! Workspace path normalization
//!
//! The presentation layer addresses the workspace root with the literal
//! sentinel `"root"`. Everything entering the core is normalized here, and
//! the wire renderings for each endpoint family are derived from a single
//! [`WorkspacePath`].

use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Literal used by the presentation layer for the workspace root.
pub const ROOT_SENTINEL: &str = "root";

/// Rewrite the root sentinel to the empty workspace scope (`""`).
///
/// Every other value passes through unchanged. Idempotent.
pub fn normalize_workspace_scope(path: &str) -> &str {
    if path == ROOT_SENTINEL {
        ""
    } else {
        path
    }
}

/// Rewrite the root sentinel (or the empty scope) to `"/"`.
///
/// Every other value passes through unchanged. Idempotent.
pub fn normalize_target_path(path: &str) -> &str {
    match normalize_workspace_scope(path) {
        "" => "/",
        other => other,
    }
}

/// NFC form of a single entry name. Tree keys and lookup segments both go
/// through this so composed and decomposed names address the same entry.
pub fn nfc_name(name: &str) -> String {
    name.nfc().collect()
}

/// A location in the remote workspace.
///
/// Holds the caller's path verbatim (after sentinel normalization) so wire
/// values are never reshaped. Tree lookups go through [`WorkspacePath::segments`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspacePath {
    raw: String,
}

impl WorkspacePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn parse(input: &str) -> Self {
        Self {
            raw: normalize_workspace_scope(input).to_string(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.raw.is_empty()
    }

    /// Non-empty path components, NFC-normalized.
    pub fn segments(&self) -> Vec<String> {
        self.raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(nfc_name)
            .collect()
    }

    /// Wire value for sparse-pull's `workspace` field: root is `""`.
    pub fn sparse_scope(&self) -> &str {
        &self.raw
    }

    /// Wire value for create-folder's `baseDir` and upload's
    /// `targetRelativePath`: root is `""`.
    pub fn relative_dir(&self) -> &str {
        &self.raw
    }

    /// Wire value for delete and export paths: root is `"/"`.
    pub fn target_path(&self) -> &str {
        normalize_target_path(&self.raw)
    }

    /// Child path. Joins with a single `/`.
    pub fn join(&self, name: &str) -> Self {
        let name = name.trim_matches('/');
        if self.raw.is_empty() {
            return Self {
                raw: format!("/{}", name),
            };
        }
        Self {
            raw: format!("{}/{}", self.raw.trim_end_matches('/'), name),
        }
    }

    /// Canonical key used for overlap checks: `/`-joined segments.
    pub fn key(&self) -> String {
        let segments = self.segments();
        if segments.is_empty() {
            "/".to_string()
        } else {
            format!("/{}", segments.join("/"))
        }
    }

    /// True when `self` equals `other` or is one of its ancestors.
    pub fn contains(&self, other: &WorkspacePath) -> bool {
        let mine = self.segments();
        let theirs = other.segments();
        mine.len() <= theirs.len() && mine.iter().zip(theirs.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Display for WorkspacePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target_path())
    }
}

impl From<&str> for WorkspacePath {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}
