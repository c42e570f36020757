//! Shallow clones of remote repositories

use crate::fetch::RepoContext;
use crate::utils::repo_id_from_url;
use anyhow::{Context, Result};
use git2::{FetchOptions, Repository};
use std::env;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Clone `url` (default branch, depth 1) into a fresh temp directory.
///
/// Falls back to a full clone when the server refuses shallow fetches.
/// Failures are logged and returned; the partial directory is removed.
pub fn clone_repository(url: &str) -> Result<RepoContext> {
    let temp_dir = build_temp_repo_dir();
    std::fs::create_dir_all(&temp_dir)
        .with_context(|| format!("Failed creating temp directory: {}", temp_dir.display()))?;
    // Owns the directory from here on, so every early return cleans up
    let context = RepoContext::new(temp_dir, repo_id_from_url(url), true);

    let normalized = normalize_github_url(url);
    tracing::info!("Cloning {}", normalized);
    let cloned = shallow_clone(&normalized, context.root()).or_else(|shallow_err| {
        tracing::debug!("Shallow clone failed, retrying full clone: {:#}", shallow_err);
        Repository::clone(&normalized, context.root())
            .with_context(|| format!("Failed cloning repository from {normalized}"))
    });

    match cloned {
        Ok(_) => Ok(context),
        Err(err) => {
            tracing::error!("Clone of {} failed: {:#}", normalized, err);
            Err(err)
        }
    }
}

/// GitHub HTTPS URLs get a `.git` suffix; anything else is left alone.
fn normalize_github_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.contains("github.com") && !trimmed.ends_with(".git") {
        format!("{trimmed}.git")
    } else {
        trimmed.to_string()
    }
}

fn shallow_clone(url: &str, dest: &Path) -> Result<Repository> {
    let mut fo = FetchOptions::new();
    fo.depth(1);

    let mut builder = git2::build::RepoBuilder::new();
    builder.fetch_options(fo);

    builder.clone(url, dest).with_context(|| format!("Shallow clone from {url} failed"))
}

fn build_temp_repo_dir() -> PathBuf {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_nanos()).unwrap_or(0);
    let pid = std::process::id();
    env::temp_dir().join(format!("readme-gen-{pid}-{nanos}"))
}
