//! Collect command implementation

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::dataset::{finish_dataset, push_rows, upload_token, OutputArgs};
use super::progress::create_progress_bar;
use crate::config::{CliOverrides, Credentials};
use crate::domain::Row;
use crate::emit::{DirectorySink, RowEmitter};
use crate::remote::github_api::REQUEST_PAUSE;
use crate::remote::{GitHubApi, Sleeper, ThreadSleeper};
use crate::render::DatasetStats;

const DEFAULT_MAX_REPOS: usize = 100;

#[derive(Args)]
pub struct CollectArgs {
    /// GitHub search query, e.g. "language:python stars:>1000"
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Where chunk files and report.json are written
    #[arg(short, long, value_name = "DIR", default_value = "dataset")]
    pub output_dir: PathBuf,

    /// Upload the output directory to this dataset repository afterwards
    #[arg(long, value_name = "REPO_ID")]
    pub upload: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Collect at most this many repositories
    #[arg(long, value_name = "N")]
    pub max_repos: Option<usize>,
}

pub fn run(args: CollectArgs, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliOverrides {
        output_format: args.output.format,
        rows_per_chunk: args.output.rows_per_chunk,
        max_repos: args.max_repos,
        ..CliOverrides::default()
    };
    let config = super::resolve_config(config_path, overrides)?;
    let hub_token = upload_token(args.upload.as_deref())?;

    let credentials = Credentials::from_env();
    if credentials.github_token.is_none() {
        tracing::warn!("GITHUB_TOKEN not set; GitHub API rate limits will be low");
    }
    let api = GitHubApi::new(credentials.github_token.clone())?;
    let sleeper = ThreadSleeper;
    let max = config.max_repos.unwrap_or(DEFAULT_MAX_REPOS);
    let repos = api.search_repos(&args.query, max, &sleeper)?;

    let rules = config.scan_rules();
    let sink = DirectorySink::create(&args.output_dir, config.output_format)?;
    let mut emitter = RowEmitter::new(sink, config.rows_per_chunk);
    let mut stats = DatasetStats::default();

    let pb = create_progress_bar(repos.len() as u64, "collecting");
    for (idx, repo) in repos.iter().enumerate() {
        if idx > 0 {
            sleeper.sleep(REQUEST_PAUSE);
        }
        pb.set_message(repo.full_name.clone());
        tracing::debug!("Collecting {} ({} stars)", repo.full_name, repo.stargazers_count);
        match api.repo_record(&repo.full_name, &rules) {
            Ok(record) => {
                stats.repos_processed += 1;
                push_rows(&mut emitter, &mut stats, vec![Row::Repo(record)])?;
            }
            Err(err) => {
                stats.repos_failed += 1;
                pb.suspend(|| tracing::warn!("Skipping {}: {}", repo.full_name, err));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    finish_dataset(emitter, &stats, &args.output_dir, args.upload.as_deref(), hub_token)
}
