//! Core data types shared across the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Extensions treated as non-text or low-value. Matching is case-sensitive.
pub fn default_excluded_extensions() -> &'static [&'static str] {
    &[
        // Images
        ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".tiff", ".ico", ".svg", ".webp", ".psd",
        // Video
        ".mp4", ".avi", ".mov", ".mkv", ".wmv", ".flv", ".webm",
        // Documents
        ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt",
        // Audio
        ".mp3", ".wav", ".flac", ".aac", ".ogg", ".m4a",
        // Archives
        ".zip", ".tar", ".gz", ".rar", ".7z", ".bz2", ".xz",
        // Model weights
        ".pt", ".pth", ".h5", ".ckpt", ".safetensors", ".onnx", ".pb", ".pkl", ".tflite", ".bin",
        // Other binary
        ".exe", ".dll", ".so", ".dylib", ".o", ".a", ".class", ".jar", ".pyc", ".whl", ".db",
        ".sqlite", ".npy", ".npz", ".parquet", ".feather", ".ftr", ".ttf", ".woff", ".woff2",
        ".eot",
    ]
}

/// Directories never descended into.
pub fn default_skip_dirs() -> &'static [&'static str] {
    &[".git", "__pycache__", ".idea", ".vscode", ".vs"]
}

/// Name fragments marking a file as high-signal (entry point, manifest, config).
pub fn default_key_patterns() -> &'static [&'static str] {
    &[
        "main",
        "index",
        "app",
        "setup.py",
        "package.json",
        "requirements.txt",
        "Dockerfile",
        "docker-compose.yml",
    ]
}

/// A file discovered by the tree walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub absolute_path: PathBuf,
    /// Path relative to the repository root, `/`-separated.
    pub relative_path: String,
    /// Extension with its leading dot and original case, or empty.
    pub extension: String,
}

impl FileEntry {
    pub fn file_name(&self) -> &str {
        self.relative_path.rsplit('/').next().unwrap_or(&self.relative_path)
    }

    /// Number of path components below the repository root.
    pub fn depth(&self) -> usize {
        self.relative_path.split('/').count()
    }
}

/// How a classified file is routed through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileRole {
    Excluded,
    Readme,
    Key,
    Ordinary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub entry: FileEntry,
    pub is_readme: bool,
    pub is_key: bool,
    pub is_excluded: bool,
}

impl ClassifiedFile {
    /// Excluded wins over everything; a README is never also a key snippet.
    pub fn role(&self) -> FileRole {
        if self.is_excluded {
            FileRole::Excluded
        } else if self.is_readme {
            FileRole::Readme
        } else if self.is_key {
            FileRole::Key
        } else {
            FileRole::Ordinary
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedContent {
    pub relative_path: String,
    pub text: String,
}

impl LoadedContent {
    pub fn new(relative_path: impl Into<String>, text: impl Into<String>) -> Self {
        Self { relative_path: relative_path.into(), text: text.into() }
    }
}

/// Directory layout of a repository, independent of file content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TreeNode {
    Directory { name: String, children: Vec<TreeNode> },
    File { name: String },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Directory { name, .. } | TreeNode::File { name } => name,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Directory { children, .. } => children,
            TreeNode::File { .. } => &[],
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, TreeNode::Directory { .. })
    }
}

/// One row per repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub repo_id: String,
    pub file_structure: TreeNode,
    pub readme_content: String,
    pub key_snippets: BTreeMap<String, String>,
}

/// One row per file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub repo_id: String,
    pub file_path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Row {
    Repo(RepoRecord),
    File(FileRecord),
}

impl Row {
    pub fn repo_id(&self) -> &str {
        match self {
            Row::Repo(record) => &record.repo_id,
            Row::File(record) => &record.repo_id,
        }
    }
}

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? } default $default:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "Invalid {} '{}'. Expected one of: {}",
                        stringify!($name),
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $($name::$variant => $text,)+
                };
                f.write_str(text)
            }
        }
    };
}

string_enum! {
    /// Which record shape the dataset builder emits.
    RecordShape { Aggregated => "aggregated", Flattened => "flattened" } default Aggregated
}

string_enum! {
    /// On-disk encoding of a sealed chunk.
    OutputFormat { Columnar => "columnar", Jsonl => "jsonl" } default Columnar
}

string_enum! {
    /// How the chunk assembler cuts the concatenated text.
    SplitPolicy { CharSlice => "char-slice", FileBoundary => "file-boundary" } default CharSlice
}

string_enum! {
    /// Whether prompt contents use whole files or short previews of key files.
    ContentMode { Full => "full", Preview => "preview" } default Full
}

string_enum! {
    /// Hosted completion API.
    Provider {
        OpenAi => "openai",
        Gemini => "gemini",
        HuggingFace => "huggingface",
    } default OpenAi
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Columnar => "json",
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

/// Tool configuration. Every field has a default, so partial files are valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(deserialize_with = "extension_list")]
    pub excluded_extensions: Vec<String>,
    #[serde(deserialize_with = "name_list")]
    pub skip_dirs: Vec<String>,
    #[serde(deserialize_with = "name_list")]
    pub key_patterns: Vec<String>,

    pub content_mode: ContentMode,
    pub preview_lines: usize,
    pub max_prompt_files: usize,
    pub chunk_chars: usize,
    pub split_policy: SplitPolicy,

    pub snippet_chars: usize,
    pub record_shape: RecordShape,
    pub output_format: OutputFormat,
    pub rows_per_chunk: usize,
    pub max_repos: Option<usize>,

    pub provider: Provider,
    pub model: Option<String>,
    pub api_base_url: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,

    pub retry_max_attempts: u32,
    pub retry_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excluded_extensions: default_excluded_extensions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            skip_dirs: default_skip_dirs().iter().map(|s| s.to_string()).collect(),
            key_patterns: default_key_patterns().iter().map(|s| s.to_string()).collect(),
            content_mode: ContentMode::Full,
            preview_lines: 50,
            max_prompt_files: 10,
            chunk_chars: 16_384,
            split_policy: SplitPolicy::CharSlice,
            snippet_chars: 4_000,
            record_shape: RecordShape::Aggregated,
            output_format: OutputFormat::Columnar,
            rows_per_chunk: 100,
            max_repos: None,
            provider: Provider::OpenAi,
            model: None,
            api_base_url: None,
            temperature: 0.8,
            max_output_tokens: 2_048,
            retry_max_attempts: 3,
            retry_delay_secs: 60,
        }
    }
}

impl Config {
    pub fn scan_rules(&self) -> ScanRules {
        ScanRules {
            skip_dirs: self.skip_dirs.iter().cloned().collect(),
            excluded_extensions: self.excluded_extensions.iter().cloned().collect(),
            key_patterns: self.key_patterns.iter().map(|p| p.to_lowercase()).collect(),
        }
    }
}

/// Accepts either a list or a single comma-separated string.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrCsv {
    List(Vec<String>),
    Csv(String),
}

impl ListOrCsv {
    fn into_items(self) -> Vec<String> {
        let raw = match self {
            ListOrCsv::List(items) => items,
            ListOrCsv::Csv(text) => text.split(',').map(str::to_string).collect(),
        };
        raw.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
    }
}

fn name_list<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(ListOrCsv::deserialize(deserializer)?.into_items())
}

/// Like [`name_list`], with a leading dot added where missing.
fn extension_list<'de, D: serde::Deserializer<'de>>(
    deserializer: D,
) -> Result<Vec<String>, D::Error> {
    Ok(ListOrCsv::deserialize(deserializer)?
        .into_items()
        .into_iter()
        .map(|ext| if ext.starts_with('.') { ext } else { format!(".{ext}") })
        .collect())
}

/// Precomputed filters used by the walker, classifier and structure serializer.
#[derive(Debug, Clone)]
pub struct ScanRules {
    pub skip_dirs: HashSet<String>,
    pub excluded_extensions: HashSet<String>,
    /// Lower-cased.
    pub key_patterns: Vec<String>,
}

impl Default for ScanRules {
    fn default() -> Self {
        Config::default().scan_rules()
    }
}

impl ScanRules {
    /// Hidden entries and denylisted directories are never visited.
    pub fn skips(&self, name: &str, is_dir: bool) -> bool {
        name.starts_with('.') || (is_dir && self.skip_dirs.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_precedence() {
        let entry = FileEntry {
            absolute_path: PathBuf::from("/r/README_app.md"),
            relative_path: "README_app.md".to_string(),
            extension: ".md".to_string(),
        };
        let file = ClassifiedFile { entry, is_readme: true, is_key: true, is_excluded: false };
        assert_eq!(file.role(), FileRole::Readme);

        let excluded = ClassifiedFile { is_excluded: true, ..file };
        assert_eq!(excluded.role(), FileRole::Excluded);
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("flattened".parse::<RecordShape>(), Ok(RecordShape::Flattened));
        assert_eq!(" JSONL ".parse::<OutputFormat>(), Ok(OutputFormat::Jsonl));
        assert_eq!("file-boundary".parse::<SplitPolicy>(), Ok(SplitPolicy::FileBoundary));
        let err = "rows".parse::<RecordShape>().unwrap_err();
        assert!(err.contains("aggregated, flattened"));
    }

    #[test]
    fn test_enum_serde_matches_display() {
        assert_eq!(serde_json::to_string(&Provider::OpenAi).unwrap(), r#""openai""#);
        assert_eq!(serde_json::to_string(&Provider::HuggingFace).unwrap(), r#""huggingface""#);
        assert_eq!(serde_json::to_string(&SplitPolicy::FileBoundary).unwrap(), r#""file-boundary""#);
        let provider: Provider = serde_json::from_str(r#""openai""#).unwrap();
        assert_eq!(provider, Provider::OpenAi);
        assert_eq!(provider.to_string(), "openai");
    }

    #[test]
    fn test_tree_node_json_shape() {
        let tree = TreeNode::Directory {
            name: "repo".to_string(),
            children: vec![TreeNode::File { name: "a.py".to_string() }],
        };
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(
            json,
            r#"{"type":"directory","name":"repo","children":[{"type":"file","name":"a.py"}]}"#
        );
    }

    #[test]
    fn test_file_entry_helpers() {
        let entry = FileEntry {
            absolute_path: PathBuf::from("/r/src/app/main.py"),
            relative_path: "src/app/main.py".to_string(),
            extension: ".py".to_string(),
        };
        assert_eq!(entry.file_name(), "main.py");
        assert_eq!(entry.depth(), 3);
    }
}
