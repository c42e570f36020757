//! Dataset run report.

use crate::domain::Row;
use crate::emit::SealedChunk;
use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use std::path::Path;

/// Per-run counters collected while building a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatasetStats {
    pub repos_processed: usize,
    pub repos_failed: usize,
    pub repos_with_readme: usize,
    pub total_readme_chars: usize,
    pub rows: usize,
}

impl DatasetStats {
    pub fn record_readme(&mut self, readme: &str) {
        let len = readme.chars().count();
        self.total_readme_chars += len;
        if len > 0 {
            self.repos_with_readme += 1;
        }
    }

    /// Count one repository's rows. Flattened rows contribute the shallowest
    /// README file, the same one an aggregated record would carry.
    pub fn record_rows(&mut self, rows: &[Row]) {
        let mut flattened_readme: Option<(usize, &str)> = None;
        for row in rows {
            match row {
                Row::Repo(record) => self.record_readme(&record.readme_content),
                Row::File(file) => {
                    let name = file.file_path.rsplit('/').next().unwrap_or(&file.file_path);
                    if !name.to_lowercase().starts_with("readme") {
                        continue;
                    }
                    let depth = file.file_path.matches('/').count();
                    if flattened_readme.map_or(true, |(best, _)| depth < best) {
                        flattened_readme = Some((depth, &file.content));
                    }
                }
            }
        }
        if let Some((_, readme)) = flattened_readme {
            self.record_readme(readme);
        }
        self.rows += rows.len();
    }

    pub fn average_readme_chars(&self) -> f64 {
        if self.repos_processed == 0 {
            0.0
        } else {
            self.total_readme_chars as f64 / self.repos_processed as f64
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Repositories: {} processed, {} failed\nRows: {}\nRepositories with README: {}\nAverage README length: {:.2} characters",
            self.repos_processed,
            self.repos_failed,
            self.rows,
            self.repos_with_readme,
            self.average_readme_chars()
        )
    }
}

pub fn write_report(
    report_path: &Path,
    stats: &DatasetStats,
    chunks: &[SealedChunk],
    include_timestamp: bool,
) -> Result<()> {
    let chunk_manifest = chunks
        .iter()
        .map(|c| {
            json!({
                "sequence": c.sequence,
                "rows": c.rows,
                "file": c.path.file_name().and_then(|n| n.to_str()).unwrap_or_default(),
            })
        })
        .collect::<Vec<_>>();

    let mut report = json!({
        "stats": {
            "repos_processed": stats.repos_processed,
            "repos_failed": stats.repos_failed,
            "repos_with_readme": stats.repos_with_readme,
            "average_readme_chars": (stats.average_readme_chars() * 100.0).round() / 100.0,
            "rows": stats.rows,
        },
        "chunks": chunk_manifest,
    });
    if include_timestamp {
        report["generated_at"] = json!(Utc::now().to_rfc3339());
    }

    let content = serde_json::to_string_pretty(&report)?;
    std::fs::write(report_path, format!("{content}\n"))
        .with_context(|| format!("Failed writing report: {}", report_path.display()))?;
    Ok(())
}
