//! Local checkouts

use crate::fetch::RepoContext;
use crate::utils::repo_id_from_path;
use anyhow::{Context, Result};
use std::path::Path;

/// Use an existing directory in place. Nothing is deleted afterwards.
pub fn validate_local_path(path: &Path) -> Result<RepoContext> {
    let canonical = path
        .canonicalize()
        .with_context(|| format!("Path does not exist: {}", path.display()))?;

    if !canonical.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }

    let repo_id = repo_id_from_path(&canonical);
    Ok(RepoContext::new(canonical, repo_id, false))
}
