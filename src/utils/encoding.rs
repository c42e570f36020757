//! Lossy UTF-8 file reading.
//!
//! Repositories routinely contain files with stray Latin-1 bytes or a UTF-8
//! BOM. Reads here never fail on bad bytes: a UTF-8 BOM is stripped and
//! malformed sequences become U+FFFD.

use anyhow::{Context, Result};
use encoding_rs::UTF_8;
use std::path::Path;

/// Decode bytes as UTF-8, replacing malformed sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let (decoded, _had_errors) = UTF_8.decode_with_bom_removal(bytes);
    decoded.into_owned()
}

/// Read a whole file with lossy UTF-8 decoding.
///
/// Only I/O errors surface; decoding problems never do.
pub fn read_file_lossy(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    let (decoded, had_errors) = UTF_8.decode_with_bom_removal(&bytes);
    if had_errors {
        tracing::debug!("replaced malformed UTF-8 in {}", path.display());
    }
    Ok(decoded.into_owned())
}

/// Keep the first `max_lines` lines of `text`, line endings included.
pub fn first_lines(text: &str, max_lines: usize) -> String {
    text.split_inclusive('\n').take(max_lines).collect()
}

/// Truncate to at most `max_chars` characters without splitting a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_utf8() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all("Test content 🚀".as_bytes()).unwrap();
        file.flush().unwrap();

        assert_eq!(read_file_lossy(file.path()).unwrap(), "Test content 🚀");
    }

    #[test]
    fn test_read_strips_bom() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0xef, 0xbb, 0xbf]).unwrap();
        file.write_all(b"Hello").unwrap();
        file.flush().unwrap();

        assert_eq!(read_file_lossy(file.path()).unwrap(), "Hello");
    }

    #[test]
    fn test_utf16_bom_is_not_sniffed() {
        // FF FE would switch a sniffing decoder to UTF-16LE
        let decoded = decode_lossy(&[0xff, 0xfe, b'H', 0x00, b'i', 0x00]);
        assert_eq!(decoded, "\u{FFFD}\u{FFFD}H\0i\0");
    }

    #[test]
    fn test_read_replaces_invalid_bytes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"caf\xe9 ok").unwrap();
        file.flush().unwrap();

        let content = read_file_lossy(file.path()).unwrap();
        assert!(content.starts_with("caf"));
        assert!(content.ends_with(" ok"));
        assert!(content.contains('\u{FFFD}'));
    }

    #[test]
    fn test_read_missing_file_is_error() {
        assert!(read_file_lossy(Path::new("/definitely/not/here.txt")).is_err());
    }

    #[test]
    fn test_first_lines_keeps_endings() {
        assert_eq!(first_lines("a\nb\nc\n", 2), "a\nb\n");
        assert_eq!(first_lines("a\nb", 5), "a\nb");
        assert_eq!(first_lines("", 3), "");
    }

    #[test]
    fn test_truncate_chars_respects_code_points() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
