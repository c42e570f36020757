//! Repository tree walker

use crate::domain::{FileEntry, ScanRules};
use crate::utils::normalize_path;
use ignore::{DirEntry, WalkBuilder};
use std::path::{Path, PathBuf};

/// Lazily enumerate every file under `root`.
///
/// Hidden entries and denylisted directories are pruned before they are
/// descended into. Siblings are visited in file-name order so the sequence is
/// reproducible for a fixed filesystem state. Unreadable directories are
/// logged and skipped.
pub fn walk(root: &Path, rules: &ScanRules) -> impl Iterator<Item = FileEntry> {
    let root_path: PathBuf = root.to_path_buf();
    let filter_rules = rules.clone();

    // Directory filter: the root is always kept, whatever its name
    let entry_filter = move |entry: &DirEntry| -> bool {
        if entry.depth() == 0 {
            return true;
        }
        let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
        match entry.file_name().to_str() {
            Some(name) => !filter_rules.skips(name, is_dir),
            None => true,
        }
    };

    let mut builder = WalkBuilder::new(&root_path);
    builder
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(entry_filter);

    builder.build().filter_map(move |entry_result| {
        let entry = match entry_result {
            Ok(e) => e,
            Err(err) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root_path.display(), err);
                return None;
            }
        };

        if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
            return None;
        }

        let path = entry.path();
        let rel_path = match path.strip_prefix(&root_path) {
            Ok(p) => normalize_path(&p.to_string_lossy()),
            Err(_) => return None,
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        Some(FileEntry { absolute_path: path.to_path_buf(), relative_path: rel_path, extension })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn rel_paths(root: &Path) -> Vec<String> {
        walk(root, &ScanRules::default()).map(|e| e.relative_path).collect()
    }

    #[test]
    fn test_walk_finds_nested_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("src/app")).unwrap();
        fs::write(root.join("src/app/main.py"), "print(1)").unwrap();
        fs::write(root.join("setup.py"), "").unwrap();

        let paths = rel_paths(root);
        assert!(paths.contains(&"src/app/main.py".to_string()));
        assert!(paths.contains(&"setup.py".to_string()));
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_walk_skips_hidden_and_denylisted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        for dir in [".git", "__pycache__", ".idea", ".vscode", ".cache", "pkg/__pycache__"] {
            fs::create_dir_all(root.join(dir)).unwrap();
            fs::write(root.join(dir).join("file.py"), "# noise").unwrap();
        }
        fs::write(root.join(".env"), "SECRET=1").unwrap();
        fs::write(root.join("pkg/.hidden.py"), "x").unwrap();
        fs::write(root.join("pkg/mod.py"), "x = 1").unwrap();

        let paths = rel_paths(root);
        assert_eq!(paths, vec!["pkg/mod.py".to_string()]);
        for path in &paths {
            assert!(path.split('/').all(|part| !part.starts_with('.')));
        }
    }

    #[test]
    fn test_walk_is_deterministic_and_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        for name in ["c.py", "a.py", "b.py"] {
            fs::write(root.join(name), name).unwrap();
        }

        let first = rel_paths(root);
        assert_eq!(first, vec!["a.py", "b.py", "c.py"]);
        assert_eq!(first, rel_paths(root));
    }

    #[test]
    fn test_walk_records_extension_case() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("Logo.PNG"), [0u8; 4]).unwrap();
        fs::write(root.join("Makefile"), "all:").unwrap();

        let entries: Vec<FileEntry> = walk(root, &ScanRules::default()).collect();
        let logo = entries.iter().find(|e| e.relative_path == "Logo.PNG").unwrap();
        assert_eq!(logo.extension, ".PNG");
        let makefile = entries.iter().find(|e| e.relative_path == "Makefile").unwrap();
        assert_eq!(makefile.extension, "");
    }

    #[test]
    fn test_walk_missing_root_yields_nothing() {
        let temp_dir = TempDir::new().unwrap();
        assert!(rel_paths(&temp_dir.path().join("missing")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_continues_past_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("locked")).unwrap();
        fs::write(root.join("locked/inner.py"), "x").unwrap();
        fs::write(root.join("open.py"), "y").unwrap();
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o000)).unwrap();

        let paths = rel_paths(root);
        fs::set_permissions(root.join("locked"), fs::Permissions::from_mode(0o755)).unwrap();

        assert!(paths.contains(&"open.py".to_string()));
    }
}
