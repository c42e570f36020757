//! Upload command implementation

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use crate::config::Credentials;
use crate::remote::{DatasetUploader, HubClient};

#[derive(Args)]
pub struct UploadArgs {
    /// Folder of chunk files
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Dataset repository, e.g. "user/readme-dataset"
    #[arg(value_name = "REPO_ID")]
    pub repo_id: String,

    /// Directory inside the dataset repository [default: data/<UTC timestamp>]
    #[arg(long, value_name = "DIR")]
    pub path_in_repo: Option<String>,
}

pub fn run(args: UploadArgs) -> Result<()> {
    let credentials = Credentials::from_env();
    let token = credentials.require_hf()?;

    if !args.folder.is_dir() {
        anyhow::bail!("Not a directory: {}", args.folder.display());
    }

    let mut hub = HubClient::new(token)?;
    if let Some(prefix) = args.path_in_repo {
        hub = hub.path_prefix(prefix);
    }
    let summary = hub.upload_folder(&args.folder, &args.repo_id)?;
    println!("Uploaded {} files to {} ({}/)", summary.files, summary.url, summary.prefix);
    Ok(())
}
