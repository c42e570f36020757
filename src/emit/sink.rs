//! Chunk files on disk.

use crate::domain::{OutputFormat, Row};
use crate::emit::ChunkSink;
use crate::render::render_rows;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// `df_chunk_{sequence}_{rows}.{ext}`. Two chunks only share a name when both
/// sequence and row count match.
pub fn chunk_file_name(sequence: usize, rows: usize, format: OutputFormat) -> String {
    format!("df_chunk_{}_{}.{}", sequence, rows, format.extension())
}

/// Writes each chunk as its own file in one directory.
pub struct DirectorySink {
    dir: PathBuf,
    format: OutputFormat,
}

impl DirectorySink {
    /// Create the directory if it does not exist yet.
    pub fn create(dir: &Path, format: OutputFormat) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed creating output directory: {}", dir.display()))?;
        Ok(Self { dir: dir.to_path_buf(), format })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ChunkSink for DirectorySink {
    fn write_chunk(&mut self, sequence: usize, rows: &[Row]) -> Result<PathBuf> {
        let path = self.dir.join(chunk_file_name(sequence, rows.len(), self.format));
        let content = render_rows(rows, self.format)?;
        fs::write(&path, content)
            .with_context(|| format!("Failed writing chunk file: {}", path.display()))?;
        Ok(path)
    }
}
