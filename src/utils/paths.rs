//! Path normalization and repository identifiers

use std::path::Path;

pub fn normalize_path(path: &str) -> String {
    // Convert backslashes to forward slashes and normalize
    path.replace('\\', "/")
}

/// Repository id for a local checkout: its directory name.
pub fn repo_id_from_path(path: &Path) -> String {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("repository").to_string()
}

/// Repository id for a clone URL: `owner/name` when the URL has both,
/// otherwise the last path segment. A trailing `.git` is dropped.
pub fn repo_id_from_url(url: &str) -> String {
    let trimmed = url.trim().trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    let path = match trimmed.find("://") {
        Some(pos) => {
            let after_scheme = &trimmed[pos + 3..];
            after_scheme.split_once('/').map(|(_, rest)| rest).unwrap_or("")
        }
        // scp-like form: git@github.com:owner/repo
        None => trimmed.split_once(':').map(|(_, rest)| rest).unwrap_or(trimmed),
    };
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [] => "repository".to_string(),
        [only] => (*only).to_string(),
        [.., owner, name] => format!("{owner}/{name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("src\\app\\main.py"), "src/app/main.py");
    }

    #[test]
    fn test_repo_id_from_url() {
        assert_eq!(repo_id_from_url("https://github.com/owner/repo"), "owner/repo");
        assert_eq!(repo_id_from_url("https://github.com/owner/repo.git/"), "owner/repo");
        assert_eq!(repo_id_from_url("git@github.com:owner/repo.git"), "owner/repo");
        assert_eq!(repo_id_from_url("https://example.com"), "repository");
    }

    #[test]
    fn test_repo_id_from_path() {
        assert_eq!(repo_id_from_path(Path::new("/mirror/my-repo")), "my-repo");
    }
}
