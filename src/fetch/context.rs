//! A checked-out repository and its lifetime.

use std::path::{Path, PathBuf};

/// Repository root plus its identifier. Temporary clones are deleted on drop.
pub struct RepoContext {
    pub root_path: PathBuf,
    pub repo_id: String,
    pub is_temp: bool,
}

impl RepoContext {
    pub fn new(root_path: PathBuf, repo_id: impl Into<String>, is_temp: bool) -> Self {
        Self { root_path, repo_id: repo_id.into(), is_temp }
    }

    pub fn root(&self) -> &Path {
        &self.root_path
    }
}

impl Drop for RepoContext {
    fn drop(&mut self) {
        if self.is_temp {
            if let Err(err) = std::fs::remove_dir_all(&self.root_path) {
                tracing::debug!("Failed to remove clone {}: {}", self.root_path.display(), err);
            }
        }
    }
}
