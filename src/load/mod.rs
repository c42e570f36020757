//! File content loading.
//!
//! Loading never fails: unreadable files and broken notebooks come back as
//! empty text with a warning, so one bad file cannot sink a repository.

use crate::domain::{ContentMode, LoadedContent};
use crate::utils::{first_lines, read_file_lossy};
use std::path::Path;

pub mod notebook;

pub const DEFAULT_PREVIEW_LINES: usize = 50;

#[derive(Debug, Clone)]
pub struct ContentLoader {
    mode: ContentMode,
    preview_lines: usize,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentLoader {
    pub fn new() -> Self {
        Self { mode: ContentMode::Full, preview_lines: DEFAULT_PREVIEW_LINES }
    }

    pub fn mode(mut self, mode: ContentMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn preview_lines(mut self, lines: usize) -> Self {
        self.preview_lines = lines;
        self
    }

    /// Load according to the configured mode.
    pub fn load_content(&self, path: &Path, relative_path: &str) -> LoadedContent {
        let text = match self.mode {
            ContentMode::Full => self.load(path),
            ContentMode::Preview => self.load_preview(path, self.preview_lines),
        };
        LoadedContent::new(relative_path, text)
    }

    /// Full text of a file; notebooks yield their code cells only.
    pub fn load(&self, path: &Path) -> String {
        let text = match read_file_lossy(path) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!("Failed to read file {}: {:#}", path.display(), err);
                return String::new();
            }
        };

        if !is_notebook(path) {
            return text;
        }

        match notebook::extract_code(&text) {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!("Failed to extract notebook {}: {:#}", path.display(), err);
                String::new()
            }
        }
    }

    /// First `max_lines` lines of what [`load`](Self::load) returns, from a
    /// single read.
    pub fn load_preview(&self, path: &Path, max_lines: usize) -> String {
        first_lines(&self.load(path), max_lines)
    }
}

fn is_notebook(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("ipynb")
}
