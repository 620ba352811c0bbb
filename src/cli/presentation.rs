//! CLI presentation: text and json formatters for tree views, mutation
//! receipts, settings responses, and configuration.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::orchestrator::{MutationReceipt, TreeView};
use crate::tree::{EntryKind, SyncHealth, TreeNode, TreeSnapshot};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::Value;

pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Warning line shown whenever the data on screen is the fallback tree.
pub fn format_degraded_banner(message: Option<&str>) -> String {
    let detail = message.unwrap_or("workspace server unavailable");
    format!(
        "{} {}",
        "DEGRADED".yellow().bold(),
        format!("showing fallback tree: {}", detail).yellow()
    )
}

fn banner_for(health: SyncHealth, message: Option<&str>) -> Option<String> {
    match health {
        SyncHealth::Live => None,
        SyncHealth::Degraded => Some(format_degraded_banner(message)),
    }
}

/// Indented outline of the whole tree, directories suffixed with `/`.
pub fn format_tree_outline(snapshot: &TreeSnapshot) -> String {
    let mut lines = Vec::new();
    if let Some(banner) = banner_for(snapshot.health, snapshot.message.as_deref()) {
        lines.push(banner);
    }
    lines.push("root/".to_string());
    if let TreeNode::Directory(children) = snapshot.tree.root() {
        outline_children(children, "", &mut lines);
    }
    let counts = snapshot.tree.counts();
    lines.push(format!(
        "\n{} directories, {} files",
        counts.directories, counts.files
    ));
    lines.join("\n")
}

fn outline_children(
    children: &std::collections::BTreeMap<String, TreeNode>,
    prefix: &str,
    lines: &mut Vec<String>,
) {
    let total = children.len();
    for (i, (name, node)) in children.iter().enumerate() {
        let last = i + 1 == total;
        let branch = if last { "└── " } else { "├── " };
        match node {
            TreeNode::File => lines.push(format!("{}{}{}", prefix, branch, name)),
            TreeNode::Directory(grandchildren) => {
                lines.push(format!("{}{}{}/", prefix, branch, name));
                let next = format!("{}{}", prefix, if last { "    " } else { "│   " });
                outline_children(grandchildren, &next, lines);
            }
        }
    }
}

/// The server's nested-object form, plus health, as pretty JSON.
pub fn format_tree_json(snapshot: &TreeSnapshot) -> Result<String, SyncError> {
    let out = serde_json::json!({
        "health": snapshot.health.as_str(),
        "message": snapshot.message,
        "root": snapshot.tree.to_value(),
    });
    serde_json::to_string_pretty(&out).map_err(|e| SyncError::Config(e.to_string()))
}

/// Directory listing as a table.
pub fn format_listing(view: &TreeView) -> String {
    let mut out = Vec::new();
    if let Some(banner) = banner_for(view.health, view.snapshot.message.as_deref()) {
        out.push(banner);
    }
    out.push(format_section_heading(&view.path.to_string()));

    match &view.entries {
        None => out.push(format!(
            "{} is not a directory in the current tree",
            view.path
        )),
        Some(entries) if entries.is_empty() => out.push("(empty directory)".to_string()),
        Some(entries) => {
            let mut table = Table::new();
            table.load_preset(UTF8_BORDERS_ONLY);
            table.set_header(vec!["Name", "Type"]);
            for entry in entries {
                let (name, kind) = match entry.kind {
                    EntryKind::Directory => (format!("{}/", entry.name), "directory"),
                    EntryKind::File => (entry.name.clone(), "file"),
                };
                table.add_row(vec![name, kind.to_string()]);
            }
            out.push(table.to_string());
        }
    }
    out.join("\n")
}

/// Server payloads are opaque; strings print raw, everything else as JSON.
pub fn format_payload(payload: &Value) -> String {
    match payload {
        Value::Null => "(no content)".to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

pub fn format_mutation_receipt(verb: &str, receipt: &MutationReceipt) -> String {
    let mut out = vec![format!("{} {}", verb.green(), receipt.path)];
    if let Some(message) = receipt.payload.get("message").and_then(Value::as_str) {
        out.push(format!("  {}", message));
    }
    if receipt.health == Some(SyncHealth::Degraded) {
        out.push(format!(
            "  {}",
            "tree refresh fell back to local data".yellow()
        ));
    }
    out.join("\n")
}

pub fn format_config_toml(config: &SyncConfig) -> Result<String, SyncError> {
    config.to_toml()
}

/// Single-line progress for stderr, redrawn in place.
pub fn format_upload_progress(file_name: &str, percent: u8) -> String {
    format!("\rUploading {}: {:>3}%", file_name, percent)
}
