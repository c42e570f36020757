//! Dataset command implementation

use anyhow::Result;
use clap::Args;
use std::path::{Path, PathBuf};

use super::progress::create_progress_bar;
use super::utils::list_repo_dirs;
use crate::config::{CliOverrides, Credentials};
use crate::domain::{OutputFormat, RecordShape, Row};
use crate::emit::{DirectorySink, RowEmitter};
use crate::extract::RepoExtractor;
use crate::remote::{DatasetUploader, HubClient};
use crate::render::{write_report, DatasetStats};
use crate::utils::repo_id_from_path;

pub const REPORT_FILE: &str = "report.json";

#[derive(Args)]
pub struct DatasetArgs {
    /// Directory whose subdirectories are repository checkouts
    #[arg(value_name = "MIRROR_DIR")]
    pub mirror_dir: PathBuf,

    /// Where chunk files and report.json are written
    #[arg(short, long, value_name = "DIR", default_value = "dataset")]
    pub output_dir: PathBuf,

    /// Upload the output directory to this dataset repository afterwards
    #[arg(long, value_name = "REPO_ID")]
    pub upload: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Record shape (aggregated, flattened)
    #[arg(long, value_name = "SHAPE")]
    pub shape: Option<RecordShape>,

    /// Process at most this many repositories
    #[arg(long, value_name = "N")]
    pub max_repos: Option<usize>,
}

/// Chunk options shared by `dataset` and `collect`.
#[derive(Args)]
pub struct OutputArgs {
    /// Chunk file format (columnar, jsonl)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Rows per chunk file
    #[arg(long, value_name = "ROWS")]
    pub rows_per_chunk: Option<usize>,
}

pub fn run(args: DatasetArgs, config_path: Option<&Path>) -> Result<()> {
    let overrides = CliOverrides {
        record_shape: args.shape,
        output_format: args.output.format,
        rows_per_chunk: args.output.rows_per_chunk,
        max_repos: args.max_repos,
        ..CliOverrides::default()
    };
    let config = super::resolve_config(config_path, overrides)?;
    let hub_token = upload_token(args.upload.as_deref())?;

    let repos = list_repo_dirs(&args.mirror_dir, config.max_repos)?;
    tracing::info!("Building dataset from {} repositories", repos.len());

    let extractor = RepoExtractor::new(&config);
    let sink = DirectorySink::create(&args.output_dir, config.output_format)?;
    let mut emitter = RowEmitter::new(sink, config.rows_per_chunk);
    let mut stats = DatasetStats::default();

    let pb = create_progress_bar(repos.len() as u64, "extracting");
    for dir in &repos {
        let repo_id = repo_id_from_path(dir);
        pb.set_message(repo_id.clone());
        match extractor.rows(dir, &repo_id, config.record_shape) {
            Ok(rows) => {
                stats.repos_processed += 1;
                push_rows(&mut emitter, &mut stats, rows)?;
            }
            Err(err) => {
                stats.repos_failed += 1;
                pb.suspend(|| tracing::warn!("Skipping {}: {:#}", repo_id, err));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    finish_dataset(emitter, &stats, &args.output_dir, args.upload.as_deref(), hub_token)
}

/// Resolve the hub token up front when an upload was requested.
pub(super) fn upload_token(upload: Option<&str>) -> Result<Option<String>> {
    match upload {
        Some(_) => Ok(Some(Credentials::from_env().require_hf()?.to_string())),
        None => Ok(None),
    }
}

pub(super) fn push_rows(
    emitter: &mut RowEmitter<DirectorySink>,
    stats: &mut DatasetStats,
    rows: Vec<Row>,
) -> Result<()> {
    stats.record_rows(&rows);
    for row in rows {
        emitter.push(row)?;
    }
    Ok(())
}

/// Seal the last chunk, write the report and optionally upload the folder.
pub(super) fn finish_dataset(
    emitter: RowEmitter<DirectorySink>,
    stats: &DatasetStats,
    output_dir: &Path,
    upload: Option<&str>,
    hub_token: Option<String>,
) -> Result<()> {
    let chunks = emitter.finish()?;
    write_report(&output_dir.join(REPORT_FILE), stats, &chunks, true)?;

    println!("{}", stats.summary());
    println!("Chunks: {} written to {}", chunks.len(), output_dir.display());

    if let (Some(repo_id), Some(token)) = (upload, hub_token) {
        let summary = HubClient::new(token)?.upload_folder(output_dir, repo_id)?;
        println!("Uploaded {} files to {} ({}/)", summary.files, summary.url, summary.prefix);
    }
    Ok(())
}
