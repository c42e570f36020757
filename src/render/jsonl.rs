//! JSONL rendering: one JSON object per row

use crate::domain::Row;
use anyhow::Result;

pub fn render_jsonl(rows: &[Row]) -> Result<String> {
    let mut lines = Vec::with_capacity(rows.len());
    for row in rows {
        lines.push(serde_json::to_string(row)?);
    }
    if lines.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("{}\n", lines.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FileRecord, RepoRecord, TreeNode};
    use std::collections::BTreeMap;

    #[test]
    fn test_render_file_rows() {
        let rows = vec![
            Row::File(FileRecord {
                repo_id: "demo".into(),
                file_path: "app.py".into(),
                content: "print(1)".into(),
            }),
            Row::File(FileRecord {
                repo_id: "demo".into(),
                file_path: "lib/util.py".into(),
                content: "x = 1\n".into(),
            }),
        ];
        let out = render_jsonl(&rows).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"repo_id":"demo","file_path":"app.py","content":"print(1)"}"#);
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_render_repo_row_round_trips() {
        let mut key_snippets = BTreeMap::new();
        key_snippets.insert("app.py".to_string(), "print(1)".to_string());
        let row = Row::Repo(RepoRecord {
            repo_id: "demo".into(),
            file_structure: TreeNode::Directory { name: "demo".into(), children: vec![] },
            readme_content: "Hello".into(),
            key_snippets,
        });

        let out = render_jsonl(std::slice::from_ref(&row)).unwrap();
        let parsed: Row = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(parsed, row);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_jsonl(&[]).unwrap(), "");
    }
}
