//! Output rendering (chunk files, prompts, reports)

pub mod columnar;
pub mod jsonl;
pub mod prompt;
pub mod report;

pub use columnar::render_columnar;
pub use jsonl::render_jsonl;
pub use report::{write_report, DatasetStats};

use crate::domain::{OutputFormat, Row};
use anyhow::Result;

pub fn render_rows(rows: &[Row], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Columnar => render_columnar(rows),
        OutputFormat::Jsonl => render_jsonl(rows),
    }
}
