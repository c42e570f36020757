//! Readme command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CliOverrides, Credentials};
use crate::domain::{ContentMode, Provider, SplitPolicy};
use crate::extract::RepoExtractor;
use crate::fetch::fetch_repository;
use crate::remote::{build_client, ReadmeGenerator};
use crate::scan::{render_ascii, serialize_structure};

#[derive(Args)]
pub struct ReadmeArgs {
    /// Local directory or repository URL
    #[arg(value_name = "REPO")]
    pub repo: String,

    /// Directory to write README.md into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Completion provider (openai, gemini, huggingface)
    #[arg(long, value_name = "NAME")]
    pub provider: Option<Provider>,

    /// Model name (defaults per provider)
    #[arg(long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Override the provider's API base URL
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Prompt contents: full files or key-file previews (full, preview)
    #[arg(long, value_name = "MODE")]
    pub content_mode: Option<ContentMode>,

    /// Chunk splitting (char-slice, file-boundary)
    #[arg(long, value_name = "POLICY")]
    pub split_policy: Option<SplitPolicy>,

    /// Maximum characters per prompt chunk
    #[arg(long, value_name = "CHARS")]
    pub chunk_chars: Option<usize>,

    /// Include the directory structure in every prompt
    #[arg(long)]
    pub with_tree: bool,
}

pub fn run(args: ReadmeArgs, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliOverrides {
        provider: args.provider,
        model: args.model,
        api_base_url: args.api_base_url,
        content_mode: args.content_mode,
        split_policy: args.split_policy,
        chunk_chars: args.chunk_chars,
        ..CliOverrides::default()
    };
    let config = super::resolve_config(config_path, overrides)?;

    // Fail on a missing key before any cloning
    let credentials = Credentials::from_env();
    let api_key = credentials.require_provider(config.provider)?;

    let repo = fetch_repository(&args.repo)?;
    let extractor = RepoExtractor::new(&config);
    let contents = extractor.prompt_contents(repo.root());
    tracing::info!("Collected {} files from {}", contents.len(), repo.repo_id);

    let tree = if args.with_tree {
        Some(render_ascii(&serialize_structure(repo.root(), extractor.rules())?))
    } else {
        None
    };

    let client = build_client(&config, api_key)?;
    let generator = ReadmeGenerator::from_config(client, &config);
    let readme = generator
        .generate(&contents, tree.as_deref())
        .with_context(|| format!("README generation failed for {}", repo.repo_id))?;

    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed creating output directory: {}", args.output.display()))?;
    let path = args.output.join("README.md");
    fs::write(&path, format!("{readme}\n"))
        .with_context(|| format!("Failed writing {}", path.display()))?;

    println!("README written to {}", path.display());
    Ok(())
}
