//! Code extraction from Jupyter notebooks.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

const SHELL_ESCAPE: char = '!';
const CAPTURE_MAGIC: &str = "%%capture";
const CELL_SEPARATOR: &str = "\n\n";

#[derive(Deserialize)]
struct Notebook {
    #[serde(default)]
    cells: Vec<Cell>,
}

#[derive(Deserialize)]
struct Cell {
    cell_type: String,
    #[serde(default)]
    source: Value,
}

/// Concatenated source of the code cells in a notebook document.
///
/// Markdown and raw cells are dropped, as are code cells that start with a
/// shell escape (`!pip install ...`) or contain `%%capture`. Kept cells are
/// joined in document order with a blank line between them.
pub fn extract_code(document: &str) -> Result<String> {
    let notebook: Notebook =
        serde_json::from_str(document).context("Invalid notebook JSON")?;

    let cells: Vec<String> = notebook
        .cells
        .into_iter()
        .filter(|cell| cell.cell_type == "code")
        .map(|cell| source_text(&cell.source))
        .filter(|source| keep_cell(source))
        .collect();

    Ok(cells.join(CELL_SEPARATOR))
}

/// Notebook `source` is either one string or a list of line strings.
fn source_text(source: &Value) -> String {
    match source {
        Value::String(text) => text.clone(),
        Value::Array(lines) => lines.iter().filter_map(Value::as_str).collect(),
        _ => String::new(),
    }
}

fn keep_cell(source: &str) -> bool {
    !source.trim_start().starts_with(SHELL_ESCAPE) && !source.contains(CAPTURE_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notebook(cells: Value) -> String {
        json!({ "cells": cells, "metadata": {}, "nbformat": 4, "nbformat_minor": 5 }).to_string()
    }

    #[test]
    fn test_keeps_only_code_cells_in_order() {
        let doc = notebook(json!([
            { "cell_type": "markdown", "source": ["# Title\n"] },
            { "cell_type": "code", "source": ["import os\n", "print(os.name)"] },
            { "cell_type": "raw", "source": "raw text" },
            { "cell_type": "code", "source": "x = 1" },
        ]));

        assert_eq!(extract_code(&doc).unwrap(), "import os\nprint(os.name)\n\nx = 1");
    }

    #[test]
    fn test_drops_shell_escape_and_capture_cells() {
        let doc = notebook(json!([
            { "cell_type": "code", "source": ["!pip install torch\n"] },
            { "cell_type": "code", "source": ["a = 1\n"] },
            { "cell_type": "code", "source": ["%%capture\n", "!apt-get install x\n"] },
            { "cell_type": "code", "source": ["  !ls\n"] },
            { "cell_type": "code", "source": ["import sys\n", "%%capture out\n"] },
            { "cell_type": "code", "source": ["b = 2"] },
        ]));

        let text = extract_code(&doc).unwrap();
        assert_eq!(text, "a = 1\n\n\nb = 2");
        assert!(!text.contains("pip"));
        assert!(!text.contains("capture"));
    }

    #[test]
    fn test_empty_and_missing_cells() {
        assert_eq!(extract_code(&notebook(json!([]))).unwrap(), "");
        assert_eq!(extract_code("{}").unwrap(), "");
    }

    #[test]
    fn test_malformed_notebook_is_error() {
        assert!(extract_code("{ not json").is_err());
        assert!(extract_code(r#"{"cells": "nope"}"#).is_err());
    }
}
