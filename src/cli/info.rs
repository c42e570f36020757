//! Info command implementation

use anyhow::Result;
use clap::Args;
use console::style;
use std::path::{Path, PathBuf};

use crate::config::CliOverrides;
use crate::domain::FileRole;
use crate::scan::tree::count_files;
use crate::scan::{render_ascii, scan_repository, serialize_structure, to_json};
use crate::utils::repo_id_from_path;

#[derive(Args)]
pub struct InfoArgs {
    /// Local directory path to analyze
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Print the structure as JSON instead of a tree
    #[arg(long)]
    pub json: bool,
}

#[derive(Default)]
struct RoleCounts {
    readme: Vec<String>,
    key: Vec<String>,
    ordinary: usize,
    excluded: usize,
}

pub fn run(args: InfoArgs, config_path: Option<&Path>) -> Result<()> {
    let root = args.path.canonicalize()?;
    if !root.is_dir() {
        anyhow::bail!("Path is not a directory: {}", root.display());
    }

    let config = super::resolve_config(config_path, CliOverrides::default())?;
    let rules = config.scan_rules();
    let structure = serialize_structure(&root, &rules)?;

    if args.json {
        println!("{}", to_json(&structure));
        return Ok(());
    }

    let mut counts = RoleCounts::default();
    for file in scan_repository(&root, &rules) {
        match file.role() {
            FileRole::Readme => counts.readme.push(file.entry.relative_path),
            FileRole::Key => counts.key.push(file.entry.relative_path),
            FileRole::Ordinary => counts.ordinary += 1,
            FileRole::Excluded => counts.excluded += 1,
        }
    }

    println!("{} {}", style("Repository:").bold(), repo_id_from_path(&root));
    println!("{}", style("Files:").bold());
    println!("  In structure: {}", count_files(&structure));
    println!("  README files: {}", counts.readme.len());
    println!("  Key files: {}", counts.key.len());
    println!("  Other files: {}", counts.ordinary);
    println!("  Excluded (binary/media): {}", counts.excluded);

    if !counts.readme.is_empty() {
        println!("{}", style("README:").bold());
        for path in &counts.readme {
            println!("  {}", style(path).green());
        }
    }
    if !counts.key.is_empty() {
        println!("{}", style("Key files:").bold());
        for path in &counts.key {
            println!("  {}", style(path).cyan());
        }
    }

    println!("\n{}", render_ascii(&structure));
    Ok(())
}
