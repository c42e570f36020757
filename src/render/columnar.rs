//! Column-oriented chunk encoding.
//!
//! A sealed chunk is written as one JSON document holding each column as an
//! array, so a dataframe can be rebuilt column by column:
//!
//! ```json
//! {"columns": ["repo_id", ...], "num_rows": 2, "data": {"repo_id": ["a", "b"], ...}}
//! ```

use crate::domain::Row;
use anyhow::{bail, Result};
use serde_json::{json, Map, Value};

pub const REPO_COLUMNS: &[&str] = &["repo_id", "file_structure", "readme_content", "key_snippets"];
pub const FILE_COLUMNS: &[&str] = &["repo_id", "file_path", "content"];

pub fn render_columnar(rows: &[Row]) -> Result<String> {
    let columns: &[&str] = match rows.first() {
        Some(Row::Repo(_)) => REPO_COLUMNS,
        Some(Row::File(_)) => FILE_COLUMNS,
        None => &[],
    };

    let mut data: Vec<Vec<Value>> = vec![Vec::with_capacity(rows.len()); columns.len()];
    for row in rows {
        let values = match (row, columns == REPO_COLUMNS) {
            (Row::Repo(record), true) => vec![
                Value::String(record.repo_id.clone()),
                serde_json::to_value(&record.file_structure)?,
                Value::String(record.readme_content.clone()),
                serde_json::to_value(&record.key_snippets)?,
            ],
            (Row::File(record), false) => vec![
                Value::String(record.repo_id.clone()),
                Value::String(record.file_path.clone()),
                Value::String(record.content.clone()),
            ],
            _ => bail!("Chunk mixes repository and file rows (repo {})", row.repo_id()),
        };
        for (column, value) in data.iter_mut().zip(values) {
            column.push(value);
        }
    }

    let mut data_map = Map::new();
    for (name, values) in columns.iter().zip(data) {
        data_map.insert((*name).to_string(), Value::Array(values));
    }

    let document = json!({
        "columns": columns,
        "num_rows": rows.len(),
        "data": data_map,
    });
    Ok(serde_json::to_string(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileRecord, RepoRecord, TreeNode};
    use std::collections::BTreeMap;

    fn file_row(path: &str) -> Row {
        Row::File(FileRecord {
            repo_id: "demo".into(),
            file_path: path.into(),
            content: format!("// {path}"),
        })
    }

    #[test]
    fn test_file_columns() {
        let out = render_columnar(&[file_row("a.rs"), file_row("b.rs")]).unwrap();
        let doc: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(doc["num_rows"], 2);
        assert_eq!(doc["columns"], json!(["repo_id", "file_path", "content"]));
        assert_eq!(doc["data"]["file_path"], json!(["a.rs", "b.rs"]));
        assert_eq!(doc["data"]["content"][1], "// b.rs");
    }

    #[test]
    fn test_repo_columns_keep_nested_values() {
        let mut key_snippets = BTreeMap::new();
        key_snippets.insert("app.py".to_string(), "print(1)".to_string());
        let row = Row::Repo(RepoRecord {
            repo_id: "demo".into(),
            file_structure: TreeNode::Directory {
                name: "demo".into(),
                children: vec![TreeNode::File { name: "app.py".into() }],
            },
            readme_content: "Hello".into(),
            key_snippets,
        });

        let doc: Value = serde_json::from_str(&render_columnar(&[row]).unwrap()).unwrap();
        assert_eq!(doc["data"]["readme_content"], json!(["Hello"]));
        assert_eq!(doc["data"]["key_snippets"][0]["app.py"], "print(1)");
        assert_eq!(doc["data"]["file_structure"][0]["children"][0]["name"], "app.py");
    }

    #[test]
    fn test_mixed_rows_rejected() {
        let repo = Row::Repo(RepoRecord {
            repo_id: "demo".into(),
            file_structure: TreeNode::Directory { name: "demo".into(), children: vec![] },
            readme_content: String::new(),
            key_snippets: BTreeMap::new(),
        });
        assert!(render_columnar(&[repo, file_row("a.rs")]).is_err());
    }

    #[test]
    fn test_empty_chunk() {
        let doc: Value = serde_json::from_str(&render_columnar(&[]).unwrap()).unwrap();
        assert_eq!(doc["num_rows"], 0);
    }
}
