//! Configuration loading and merging
//!
//! Precedence: CLI flags > config file > defaults. Credentials come from the
//! environment (and `.env`) separately.

pub mod env;
pub mod loader;

pub use env::Credentials;
pub use loader::load_config;

use crate::domain::{
    Config, ContentMode, OutputFormat, Provider, RecordShape, SplitPolicy,
};

/// Settings a command line may override. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub record_shape: Option<RecordShape>,
    pub output_format: Option<OutputFormat>,
    pub rows_per_chunk: Option<usize>,
    pub max_repos: Option<usize>,
    pub content_mode: Option<ContentMode>,
    pub split_policy: Option<SplitPolicy>,
    pub chunk_chars: Option<usize>,
    pub provider: Option<Provider>,
    pub model: Option<String>,
    pub api_base_url: Option<String>,
}

impl CliOverrides {
    pub fn apply(self, mut config: Config) -> Config {
        if let Some(v) = self.record_shape {
            config.record_shape = v;
        }
        if let Some(v) = self.output_format {
            config.output_format = v;
        }
        if let Some(v) = self.rows_per_chunk {
            config.rows_per_chunk = v;
        }
        if self.max_repos.is_some() {
            config.max_repos = self.max_repos;
        }
        if let Some(v) = self.content_mode {
            config.content_mode = v;
        }
        if let Some(v) = self.split_policy {
            config.split_policy = v;
        }
        if let Some(v) = self.chunk_chars {
            config.chunk_chars = v;
        }
        if let Some(v) = self.provider {
            config.provider = v;
        }
        if self.model.is_some() {
            config.model = self.model;
        }
        if self.api_base_url.is_some() {
            config.api_base_url = self.api_base_url;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides_win_over_file() {
        let file = Config { rows_per_chunk: 50, model: Some("file-model".into()), ..Config::default() };
        let merged = CliOverrides {
            rows_per_chunk: Some(7),
            output_format: Some(OutputFormat::Jsonl),
            ..CliOverrides::default()
        }
        .apply(file);

        assert_eq!(merged.rows_per_chunk, 7);
        assert_eq!(merged.output_format, OutputFormat::Jsonl);
        assert_eq!(merged.model.as_deref(), Some("file-model"));
    }
}
