//! File classification: excluded, README, key file.

use crate::domain::{ClassifiedFile, FileEntry, ScanRules};

/// Classify a walked file.
///
/// - excluded: extension (case-sensitive) is in the blocklist
/// - README: lower-cased base name starts with `readme` and not excluded
/// - key: lower-cased base name contains any key pattern
///
/// The key match is a plain substring test, so `application.py` counts as
/// key through `app`. See [`ClassifiedFile::role`] for precedence.
pub fn classify(entry: FileEntry, rules: &ScanRules) -> ClassifiedFile {
    let is_excluded = is_excluded_extension(&entry.extension, rules);
    let name = entry.file_name().to_lowercase();
    let is_readme = !is_excluded && name.starts_with("readme");
    let is_key = rules.key_patterns.iter().any(|pattern| name.contains(pattern.as_str()));

    ClassifiedFile { entry, is_readme, is_key, is_excluded }
}

pub fn is_excluded_extension(extension: &str, rules: &ScanRules) -> bool {
    !extension.is_empty() && rules.excluded_extensions.contains(extension)
}

/// Excluded-extension check straight from a file name, for callers that
/// never built a [`FileEntry`].
pub fn is_excluded_name(name: &str, rules: &ScanRules) -> bool {
    match name.rfind('.') {
        Some(idx) if idx > 0 => is_excluded_extension(&name[idx..], rules),
        _ => false,
    }
}
