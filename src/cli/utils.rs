//! Shared CLI utilities.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Immediate subdirectories of `mirror_dir`, sorted by name, at most `max`.
/// Hidden directories are skipped.
pub fn list_repo_dirs(mirror_dir: &Path, max: Option<usize>) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(mirror_dir)
        .with_context(|| format!("Failed to read mirror directory: {}", mirror_dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
        .map(|entry| entry.path())
        .collect();
    dirs.sort();
    if let Some(max) = max {
        dirs.truncate(max);
    }
    Ok(dirs)
}
