//! Directory structure serialization and rendering.

use crate::domain::{ScanRules, TreeNode};
use crate::scan::classify::is_excluded_name;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Build the directory structure under `root`.
///
/// Hidden entries, denylisted directories and files with excluded extensions
/// are left out. Children are ordered directories first, then files, each by
/// name, so the same snapshot always produces the same tree. Only an
/// unreadable root is an error; unreadable subdirectories are logged and
/// omitted.
pub fn serialize_structure(root: &Path, rules: &ScanRules) -> Result<TreeNode> {
    let name = root
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| ".".to_string());
    let children = read_children(root, rules)
        .with_context(|| format!("Failed to read repository root: {}", root.display()))?;
    Ok(TreeNode::Directory { name, children })
}

fn read_children(dir: &Path, rules: &ScanRules) -> Result<Vec<TreeNode>> {
    let mut entries: Vec<(bool, String)> = fs::read_dir(dir)?
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let file_type = entry.file_type().ok()?;
            if file_type.is_symlink() {
                return None;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            let is_dir = file_type.is_dir();

            if rules.skips(&name, is_dir) || (!is_dir && is_excluded_name(&name, rules)) {
                return None;
            }

            Some((is_dir, name))
        })
        .collect();

    entries.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let mut nodes = Vec::with_capacity(entries.len());
    for (is_dir, name) in entries {
        if !is_dir {
            nodes.push(TreeNode::File { name });
            continue;
        }
        let path = dir.join(&name);
        match read_children(&path, rules) {
            Ok(children) => nodes.push(TreeNode::Directory { name, children }),
            Err(err) => {
                tracing::warn!("Skipping unreadable directory {}: {}", path.display(), err);
            }
        }
    }

    Ok(nodes)
}

/// Canonical text encoding of a structure.
pub fn to_json(tree: &TreeNode) -> String {
    // Enum of strings and vectors; serialization cannot fail.
    serde_json::to_string(tree).unwrap_or_default()
}

/// Render a structure as an indented `├──` / `└──` tree.
pub fn render_ascii(tree: &TreeNode) -> String {
    let mut lines = vec![format!("{}/", tree.name())];
    render_children(tree.children(), "", &mut lines);
    lines.join("\n")
}

fn render_children(children: &[TreeNode], prefix: &str, lines: &mut Vec<String>) {
    let total = children.len();
    for (idx, node) in children.iter().enumerate() {
        let is_last = idx + 1 == total;
        let connector = if is_last { "└── " } else { "├── " };

        match node {
            TreeNode::Directory { name, children } => {
                lines.push(format!("{prefix}{connector}{name}/"));
                let extension = if is_last { "    " } else { "│   " };
                render_children(children, &format!("{prefix}{extension}"), lines);
            }
            TreeNode::File { name } => lines.push(format!("{prefix}{connector}{name}")),
        }
    }
}

/// Count the files in a structure.
pub fn count_files(tree: &TreeNode) -> usize {
    match tree {
        TreeNode::File { .. } => 1,
        TreeNode::Directory { children, .. } => children.iter().map(count_files).sum(),
    }
}
