//! Config file discovery and parsing

use crate::domain::Config;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Section name accepted when the settings live under a nested table.
const SECTION: &str = "readme-gen";

const CANDIDATES: &[&str] =
    &["readme-gen.toml", ".readme-gen.toml", "readme-gen.yml", "readme-gen.yaml"];

/// Load settings from `config_path`, or from the first candidate file found
/// in `search_dir`.
///
/// A file given explicitly must parse. A discovered file that fails to parse
/// is reported and replaced by defaults.
pub fn load_config(search_dir: &Path, config_path: Option<&Path>) -> Result<Config> {
    let explicit = config_path.is_some();
    let Some(config_file) = config_path.map(Path::to_path_buf).or_else(|| discover_config(search_dir))
    else {
        return Ok(Config::default());
    };

    match read_config(&config_file) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", config_file.display());
            Ok(config)
        }
        Err(err) if explicit => Err(err),
        Err(err) => {
            tracing::warn!(
                "Ignoring auto-discovered config {}: {:#}",
                config_file.display(),
                err
            );
            Ok(Config::default())
        }
    }
}

fn read_config(config_file: &Path) -> Result<Config> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;
    let ext = config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file),
        "yaml" | "yml" => parse_yaml_config(&content, config_file),
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    }
}

fn parse_toml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;
    let value = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };
    value.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

fn parse_yaml_config(content: &str, config_file: &Path) -> Result<Config> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;
    // An empty document means "all defaults"
    if raw.is_null() {
        return Ok(Config::default());
    }
    let value = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };
    serde_yaml::from_value(value)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}

fn discover_config(search_dir: &Path) -> Option<PathBuf> {
    CANDIDATES.iter().map(|candidate| search_dir.join(candidate)).find(|path| path.is_file())
}
