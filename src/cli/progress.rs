//! Progress bars for batch commands

use indicatif::{ProgressBar, ProgressStyle};

/// Bar over a known number of repositories. Hidden when stderr is not a terminal.
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} repos {msg}")
        .unwrap_or_else(|e| {
            tracing::debug!("Failed to create progress bar template: {}", e);
            ProgressStyle::default_bar()
        })
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
