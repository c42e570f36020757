//! Repository scanning: tree walk, classification, structure.

use crate::domain::{ClassifiedFile, ScanRules};
use std::path::Path;

pub mod classify;
pub mod tree;
pub mod walker;

pub use classify::classify;
pub use tree::{render_ascii, serialize_structure, to_json};
pub use walker::walk;

/// Walk and classify in one pass.
pub fn scan_repository<'a>(
    root: &Path,
    rules: &'a ScanRules,
) -> impl Iterator<Item = ClassifiedFile> + 'a {
    walk(root, rules).map(move |entry| classify(entry, rules))
}
