//! Repository fetching (local directory or remote clone)

use anyhow::Result;
use std::path::Path;

pub mod context;
pub mod github;
pub mod local;

pub use context::RepoContext;

/// Resolve a repository argument: an existing directory is used in place,
/// anything else is treated as a clone URL.
pub fn fetch_repository(source: &str) -> Result<RepoContext> {
    let path = Path::new(source);
    if path.is_dir() {
        local::validate_local_path(path)
    } else if looks_like_url(source) {
        github::clone_repository(source)
    } else {
        anyhow::bail!("Not a directory or repository URL: {source}")
    }
}

fn looks_like_url(source: &str) -> bool {
    source.contains("://") || source.starts_with("git@")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fetch_local_directory() {
        let tmp = TempDir::new().unwrap();
        let ctx = fetch_repository(&tmp.path().display().to_string()).unwrap();
        assert!(!ctx.is_temp);
    }

    #[test]
    fn test_fetch_rejects_unknown_source() {
        let err = fetch_repository("definitely/not/here").err().unwrap();
        assert!(err.to_string().contains("Not a directory"));
    }
}
