//! Workspace tree model and the server's nested-object encoding.
//!
//! The server describes the tree as nested JSON objects: a key whose value is
//! an empty object is a file, a key whose value is a non-empty object is a
//! directory.

use crate::tree::path::{nfc_name, WorkspacePath};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeParseError {
    #[error("Tree root must be an object")]
    RootNotObject,

    #[error("Entry '{0}' is not an object")]
    EntryNotObject(String),
}

/// Entry kind, as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File,
    Directory(BTreeMap<String, TreeNode>),
}

impl TreeNode {
    pub fn empty_directory() -> Self {
        TreeNode::Directory(BTreeMap::new())
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            TreeNode::File => EntryKind::File,
            TreeNode::Directory(_) => EntryKind::Directory,
        }
    }

    pub fn children(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            TreeNode::Directory(children) => Some(children),
            TreeNode::File => None,
        }
    }

    fn from_value(name: &str, value: &Value) -> Result<Self, TreeParseError> {
        let map = value
            .as_object()
            .ok_or_else(|| TreeParseError::EntryNotObject(name.to_string()))?;
        if map.is_empty() {
            return Ok(TreeNode::File);
        }
        Ok(TreeNode::Directory(parse_children(map)?))
    }

    fn to_value(&self) -> Value {
        match self {
            TreeNode::File => Value::Object(Map::new()),
            TreeNode::Directory(children) => Value::Object(
                children
                    .iter()
                    .map(|(name, child)| (name.clone(), child.to_value()))
                    .collect(),
            ),
        }
    }

    fn count(&self) -> (usize, usize) {
        match self {
            TreeNode::File => (1, 0),
            TreeNode::Directory(children) => {
                children.values().fold((0, 1), |(files, dirs), child| {
                    let (f, d) = child.count();
                    (files + f, dirs + d)
                })
            }
        }
    }
}

fn parse_children(map: &Map<String, Value>) -> Result<BTreeMap<String, TreeNode>, TreeParseError> {
    map.iter()
        .map(|(name, value)| Ok((nfc_name(name), TreeNode::from_value(name, value)?)))
        .collect()
}

/// A single named child, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub kind: EntryKind,
}

/// File and directory totals for a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeCounts {
    pub files: usize,
    /// Includes the root directory.
    pub directories: usize,
}

/// Workspace tree rooted at a directory named `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    root: TreeNode,
}

impl Default for Tree {
    fn default() -> Self {
        Self {
            root: TreeNode::empty_directory(),
        }
    }
}

impl Tree {
    pub const ROOT_NAME: &'static str = "root";

    /// Parse the `root` object of a tree response. The root is always a
    /// directory, even when empty.
    pub fn from_value(root: &Value) -> Result<Self, TreeParseError> {
        let map = root.as_object().ok_or(TreeParseError::RootNotObject)?;
        Ok(Self {
            root: TreeNode::Directory(parse_children(map)?),
        })
    }

    /// Encode back to the server's nested-object form. Names come back NFC-normalized.
    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }

    pub fn root(&self) -> &TreeNode {
        &self.root
    }

    pub fn get(&self, path: &WorkspacePath) -> Option<&TreeNode> {
        path.segments()
            .iter()
            .try_fold(&self.root, |node, segment| node.children()?.get(segment))
    }

    /// Children of the directory at `path`, directories first, then by name.
    /// `None` when the path does not exist or is a file.
    pub fn entries(&self, path: &WorkspacePath) -> Option<Vec<TreeEntry>> {
        let children = self.get(path)?.children()?;
        let mut entries: Vec<TreeEntry> = children
            .iter()
            .map(|(name, node)| TreeEntry {
                name: name.clone(),
                kind: node.kind(),
            })
            .collect();
        entries.sort_by(|a, b| {
            let rank = |k: EntryKind| matches!(k, EntryKind::File);
            rank(a.kind).cmp(&rank(b.kind)).then_with(|| a.name.cmp(&b.name))
        });
        Some(entries)
    }

    /// Insert an empty directory under `parent`.
    ///
    /// Returns false when the parent is missing or is a file, or when the name
    /// is already taken.
    pub fn insert_directory(&mut self, parent: &WorkspacePath, name: &str) -> bool {
        let mut node = &mut self.root;
        for segment in parent.segments() {
            node = match node {
                TreeNode::Directory(children) => match children.get_mut(&segment) {
                    Some(child) => child,
                    None => return false,
                },
                TreeNode::File => return false,
            };
        }
        let name = nfc_name(name);
        match node {
            TreeNode::Directory(children) if !children.contains_key(&name) => {
                children.insert(name, TreeNode::empty_directory());
                true
            }
            _ => false,
        }
    }

    pub fn counts(&self) -> TreeCounts {
        let (files, directories) = self.root.count();
        TreeCounts { files, directories }
    }
}
