//! Shared helpers

pub mod encoding;
pub mod paths;

pub use encoding::{decode_lossy, first_lines, read_file_lossy, truncate_chars};
pub use paths::{normalize_path, repo_id_from_path, repo_id_from_url};
