//! Per-repository extraction: records for the dataset builder and framed
//! contents for README prompts.

use crate::domain::{
    Config, ContentMode, FileRecord, FileRole, LoadedContent, RecordShape, RepoRecord, Row,
    ScanRules,
};
use crate::load::ContentLoader;
use crate::render::prompt::frame_file;
use crate::scan::{scan_repository, serialize_structure};
use crate::utils::truncate_chars;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub struct RepoExtractor {
    rules: ScanRules,
    loader: ContentLoader,
    content_mode: ContentMode,
    max_prompt_files: usize,
    snippet_chars: usize,
}

impl RepoExtractor {
    pub fn new(config: &Config) -> Self {
        Self {
            rules: config.scan_rules(),
            loader: ContentLoader::new()
                .mode(config.content_mode)
                .preview_lines(config.preview_lines),
            content_mode: config.content_mode,
            max_prompt_files: config.max_prompt_files,
            snippet_chars: config.snippet_chars,
        }
    }

    pub fn rules(&self) -> &ScanRules {
        &self.rules
    }

    /// Aggregated record: structure, README text and key snippets.
    ///
    /// The README slot takes the shallowest README in the tree (first in walk
    /// order on ties). READMEs never appear among the key snippets.
    pub fn record(&self, root: &Path, repo_id: &str) -> Result<RepoRecord> {
        let file_structure = serialize_structure(root, &self.rules)
            .with_context(|| format!("Failed to read structure of {repo_id}"))?;

        let mut readme: Option<(usize, PathBuf)> = None;
        let mut key_snippets = BTreeMap::new();

        for file in scan_repository(root, &self.rules) {
            match file.role() {
                FileRole::Readme => {
                    let depth = file.entry.depth();
                    if readme.as_ref().map_or(true, |(best, _)| depth < *best) {
                        readme = Some((depth, file.entry.absolute_path));
                    }
                }
                FileRole::Key => {
                    let text = self.loader.load(&file.entry.absolute_path);
                    let snippet = truncate_chars(&text, self.snippet_chars).to_string();
                    key_snippets.insert(file.entry.relative_path, snippet);
                }
                FileRole::Excluded | FileRole::Ordinary => {}
            }
        }

        let readme_content =
            readme.map(|(_, path)| self.loader.load(&path)).unwrap_or_default();

        Ok(RepoRecord { repo_id: repo_id.to_string(), file_structure, readme_content, key_snippets })
    }

    /// Flattened records: one per non-excluded file, full content.
    pub fn file_records(&self, root: &Path, repo_id: &str) -> Vec<FileRecord> {
        scan_repository(root, &self.rules)
            .filter(|file| file.role() != FileRole::Excluded)
            .map(|file| FileRecord {
                repo_id: repo_id.to_string(),
                content: self.loader.load(&file.entry.absolute_path),
                file_path: file.entry.relative_path,
            })
            .collect()
    }

    pub fn rows(&self, root: &Path, repo_id: &str, shape: RecordShape) -> Result<Vec<Row>> {
        match shape {
            RecordShape::Aggregated => Ok(vec![Row::Repo(self.record(root, repo_id)?)]),
            RecordShape::Flattened => {
                if !root.is_dir() {
                    anyhow::bail!("Repository path is not a directory: {}", root.display());
                }
                Ok(self.file_records(root, repo_id).into_iter().map(Row::File).collect())
            }
        }
    }

    /// Framed file contents for README prompts, in walk order.
    ///
    /// Full mode takes every non-excluded file except READMEs. Preview mode
    /// takes the first lines of up to `max_prompt_files` key files.
    pub fn prompt_contents(&self, root: &Path) -> Vec<LoadedContent> {
        let files = scan_repository(root, &self.rules);
        let selected: Vec<_> = match self.content_mode {
            ContentMode::Full => files
                .filter(|file| matches!(file.role(), FileRole::Key | FileRole::Ordinary))
                .collect(),
            ContentMode::Preview => files
                .filter(|file| file.role() == FileRole::Key)
                .take(self.max_prompt_files)
                .collect(),
        };
        let loaded: Vec<LoadedContent> = selected
            .iter()
            .map(|file| self.loader.load_content(&file.entry.absolute_path, &file.entry.relative_path))
            .collect();

        tracing::debug!("Collected {} files for the prompt", loaded.len());
        loaded.iter().map(frame_file).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TreeNode;
    use similar_asserts::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn scenario_repo() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::write(root.join("README.md"), "Hello").unwrap();
        fs::write(root.join("app.py"), "print(1)").unwrap();
        fs::write(root.join("logo.png"), [0x89u8, 0x50, 0x4e, 0x47]).unwrap();
        tmp
    }

    #[test]
    fn test_aggregated_record_scenario() {
        let tmp = scenario_repo();
        let config = Config { snippet_chars: 10, ..Config::default() };
        let record = RepoExtractor::new(&config).record(tmp.path(), "demo").unwrap();

        let names: Vec<&str> = record.file_structure.children().iter().map(TreeNode::name).collect();
        assert_eq!(names, vec!["README.md", "app.py"]);
        assert_eq!(record.readme_content, "Hello");
        let mut expected = BTreeMap::new();
        expected.insert("app.py".to_string(), "print(1)".to_string());
        assert_eq!(record.key_snippets, expected);
        assert_eq!(record.repo_id, "demo");
    }

    #[test]
    fn test_snippets_truncated_and_readme_not_a_snippet() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        fs::create_dir(root.join("docs")).unwrap();
        fs::write(root.join("docs/README.md"), "nested readme").unwrap();
        fs::write(root.join("README_main.md"), "top readme").unwrap();
        fs::write(root.join("main.py"), "0123456789abcdef").unwrap();

        let config = Config { snippet_chars: 10, ..Config::default() };
        let record = RepoExtractor::new(&config).record(root, "demo").unwrap();

        assert_eq!(record.readme_content, "top readme");
        assert_eq!(record.key_snippets.len(), 1);
        assert_eq!(record.key_snippets["main.py"], "0123456789");
    }

    #[test]
    fn test_repo_without_readme() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("lib.py"), "x = 1").unwrap();

        let record = RepoExtractor::new(&Config::default()).record(tmp.path(), "demo").unwrap();
        assert_eq!(record.readme_content, "");
        assert!(record.key_snippets.is_empty());
    }

    #[test]
    fn test_flattened_rows() {
        let tmp = scenario_repo();
        let rows = RepoExtractor::new(&Config::default())
            .rows(tmp.path(), "demo", RecordShape::Flattened)
            .unwrap();

        let expected = vec![
            Row::File(FileRecord {
                repo_id: "demo".into(),
                file_path: "README.md".into(),
                content: "Hello".into(),
            }),
            Row::File(FileRecord {
                repo_id: "demo".into(),
                file_path: "app.py".into(),
                content: "print(1)".into(),
            }),
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_rows_fail_for_missing_repo() {
        let tmp = TempDir::new().unwrap();
        let extractor = RepoExtractor::new(&Config::default());
        let missing = tmp.path().join("gone");
        assert!(extractor.rows(&missing, "gone", RecordShape::Aggregated).is_err());
        assert!(extractor.rows(&missing, "gone", RecordShape::Flattened).is_err());
    }

    #[test]
    fn test_prompt_contents_full_mode_skips_readme() {
        let tmp = scenario_repo();
        fs::write(tmp.path().join("utils.py"), "def f(): pass").unwrap();

        let contents = RepoExtractor::new(&Config::default()).prompt_contents(tmp.path());
        let paths: Vec<&str> = contents.iter().map(|c| c.relative_path.as_str()).collect();
        assert_eq!(paths, vec!["app.py", "utils.py"]);
        assert_eq!(contents[0].text, "File: app.py\n\nprint(1)\n\n");
    }

    #[test]
    fn test_prompt_contents_preview_mode() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        let long: String = (1..=5).map(|i| format!("line {i}\n")).collect();
        fs::write(root.join("main.py"), &long).unwrap();
        fs::write(root.join("index.js"), "console.log(1)\n").unwrap();
        fs::write(root.join("helpers.py"), "pass\n").unwrap();

        let config = Config {
            content_mode: ContentMode::Preview,
            preview_lines: 2,
            max_prompt_files: 1,
            ..Config::default()
        };
        let contents = RepoExtractor::new(&config).prompt_contents(root);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].relative_path, "index.js");

        let config = Config { max_prompt_files: 10, ..config };
        let contents = RepoExtractor::new(&config).prompt_contents(root);
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[1].text, "File: main.py\n\nline 1\nline 2\n\n\n");
    }
}
