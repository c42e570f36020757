//! Dataset upload to the Hugging Face Hub.

use crate::error::RemoteError;
use crate::remote::{error_message, http_client};
use crate::utils::normalize_path;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use reqwest::blocking::Client;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

pub const HUB_ENDPOINT: &str = "https://huggingface.co";
const SERVICE: &str = "huggingface";

/// Publishes a folder of chunk files as a dataset repository.
pub trait DatasetUploader {
    fn upload_folder(&self, folder: &Path, repo_id: &str) -> Result<UploadSummary, RemoteError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub repo_id: String,
    /// Directory inside the dataset repository that received the files.
    pub prefix: String,
    pub files: usize,
    pub url: String,
}

/// Uploads land under a fresh directory per run so chunk names restarting
/// at sequence 0 never overwrite rows from earlier batches.
pub fn run_prefix() -> String {
    format!("data/{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ"))
}

pub struct HubClient {
    client: Client,
    endpoint: String,
    token: String,
    prefix: String,
}

impl HubClient {
    pub fn new(token: impl Into<String>) -> Result<Self, RemoteError> {
        Self::with_endpoint(HUB_ENDPOINT, token)
    }

    pub fn with_endpoint(
        endpoint: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client: http_client(SERVICE)?,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            token: token.into(),
            prefix: run_prefix(),
        })
    }

    /// Directory inside the repository for uploaded files; empty means the root.
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = normalize_path(&prefix.into()).trim_matches('/').to_string();
        self
    }

    fn path_in_repo(&self, relative: &str) -> String {
        if self.prefix.is_empty() {
            relative.to_string()
        } else {
            format!("{}/{}", self.prefix, relative)
        }
    }

    /// Create the dataset repository. An existing one is fine.
    pub fn create_dataset_repo(&self, repo_id: &str) -> Result<(), RemoteError> {
        let (organization, name) = match repo_id.split_once('/') {
            Some((org, name)) => (Some(org), name),
            None => (None, repo_id),
        };
        let mut body = json!({ "type": "dataset", "name": name });
        if let Some(org) = organization {
            body["organization"] = json!(org);
        }

        let response = self
            .client
            .post(format!("{}/api/repos/create", self.endpoint))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .map_err(|e| RemoteError::transport(SERVICE, e))?;

        let status = response.status().as_u16();
        if status == 409 {
            tracing::debug!("Dataset repository {} already exists", repo_id);
            return Ok(());
        }
        if !response.status().is_success() {
            let text = response.text().unwrap_or_default();
            return Err(RemoteError::from_status(SERVICE, status, error_message(text)));
        }
        tracing::info!("Created dataset repository {}", repo_id);
        Ok(())
    }

    fn commit_files(
        &self,
        repo_id: &str,
        files: &[(String, Vec<u8>)],
    ) -> Result<(), RemoteError> {
        let mut payload = json!({
            "key": "header",
            "value": {
                "summary": format!("Upload {} file(s) with readme-gen", files.len()),
                "description": "",
            }
        })
        .to_string();
        for (path, bytes) in files {
            let line = json!({
                "key": "file",
                "value": { "path": path, "content": STANDARD.encode(bytes), "encoding": "base64" }
            });
            payload.push('\n');
            payload.push_str(&line.to_string());
        }

        let response = self
            .client
            .post(format!("{}/api/datasets/{}/commit/main", self.endpoint, repo_id))
            .bearer_auth(&self.token)
            .header(reqwest::header::CONTENT_TYPE, "application/x-ndjson")
            .body(payload)
            .send()
            .map_err(|e| RemoteError::transport(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(RemoteError::from_status(SERVICE, status.as_u16(), error_message(text)));
        }
        Ok(())
    }
}

impl DatasetUploader for HubClient {
    fn upload_folder(&self, folder: &Path, repo_id: &str) -> Result<UploadSummary, RemoteError> {
        let mut paths = Vec::new();
        collect_files(folder, &mut paths)?;
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in &paths {
            let relative = path.strip_prefix(folder).unwrap_or(path);
            let relative = normalize_path(&relative.to_string_lossy());
            files.push((self.path_in_repo(&relative), fs::read(path)?));
        }

        self.create_dataset_repo(repo_id)?;
        tracing::info!("Uploading {} file(s) to {}/{}", files.len(), repo_id, self.prefix);
        self.commit_files(repo_id, &files)?;

        Ok(UploadSummary {
            repo_id: repo_id.to_string(),
            prefix: self.prefix.clone(),
            files: files.len(),
            url: format!("{}/datasets/{}", self.endpoint, repo_id),
        })
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RemoteError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&entry.path(), out)?;
        } else if file_type.is_file() {
            out.push(entry.path());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use tempfile::TempDir;

    fn chunk_folder() -> TempDir {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("df_chunk_0_2.json"), "{}").unwrap();
        fs::create_dir(tmp.path().join("meta")).unwrap();
        fs::write(tmp.path().join("meta/report.json"), "[]").unwrap();
        tmp
    }

    #[test]
    fn test_upload_creates_repo_and_commits() {
        let mut server = mockito::Server::new();
        let create = server
            .mock("POST", "/api/repos/create")
            .match_header("authorization", "Bearer hf_test")
            .match_body(Matcher::Json(json!({
                "type": "dataset", "name": "readmes", "organization": "acme"
            })))
            .with_status(200)
            .with_body(r#"{"url":"https://huggingface.co/datasets/acme/readmes"}"#)
            .create();
        let commit = server
            .mock("POST", "/api/datasets/acme/readmes/commit/main")
            .match_header("content-type", "application/x-ndjson")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""key":"header""#.to_string()),
                Matcher::Regex(r#""path":"data/[0-9]{8}T[0-9.]+Z/df_chunk_0_2\.json""#.to_string()),
                Matcher::Regex(r#""path":"data/[0-9]{8}T[0-9.]+Z/meta/report\.json""#.to_string()),
                Matcher::Regex(r#""content":"e30=""#.to_string()),
            ]))
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create();

        let folder = chunk_folder();
        let hub = HubClient::with_endpoint(server.url(), "hf_test").unwrap();
        let summary = hub.upload_folder(folder.path(), "acme/readmes").unwrap();

        assert_eq!(summary.files, 2);
        assert!(summary.prefix.starts_with("data/"));
        assert!(summary.url.ends_with("/datasets/acme/readmes"));
        create.assert();
        commit.assert();
    }

    #[test]
    fn test_repeat_uploads_do_not_share_paths() {
        let mut server = mockito::Server::new();
        let _create = server.mock("POST", "/api/repos/create").with_status(409).expect(2).create();
        let first = server
            .mock("POST", "/api/datasets/acme/readmes/commit/main")
            .match_body(Matcher::Regex(r#""path":"batch-1/df_chunk_0_2\.json""#.to_string()))
            .with_status(200)
            .create();
        let second = server
            .mock("POST", "/api/datasets/acme/readmes/commit/main")
            .match_body(Matcher::Regex(r#""path":"batch-2/df_chunk_0_2\.json""#.to_string()))
            .with_status(200)
            .create();

        let folder = chunk_folder();
        for prefix in ["batch-1", "/batch-2/"] {
            let hub = HubClient::with_endpoint(server.url(), "hf_test").unwrap().path_prefix(prefix);
            hub.upload_folder(folder.path(), "acme/readmes").unwrap();
        }

        first.assert();
        second.assert();
    }

    #[test]
    fn test_empty_prefix_uploads_to_root() {
        let mut server = mockito::Server::new();
        let _create = server.mock("POST", "/api/repos/create").with_status(200).create();
        let commit = server
            .mock("POST", "/api/datasets/acme/readmes/commit/main")
            .match_body(Matcher::Regex(r#""path":"df_chunk_0_2\.json""#.to_string()))
            .with_status(200)
            .create();

        let folder = chunk_folder();
        let hub = HubClient::with_endpoint(server.url(), "hf_test").unwrap().path_prefix("");
        let summary = hub.upload_folder(folder.path(), "acme/readmes").unwrap();
        assert_eq!(summary.prefix, "");
        commit.assert();
    }

    #[test]
    fn test_run_prefixes_differ_between_runs() {
        let first = run_prefix();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(first.starts_with("data/"));
        assert_ne!(first, run_prefix());
    }

    #[test]
    fn test_existing_repo_is_not_an_error() {
        let mut server = mockito::Server::new();
        let _create = server
            .mock("POST", "/api/repos/create")
            .with_status(409)
            .with_body(r#"{"error":"You already created this dataset repo"}"#)
            .create();
        let commit =
            server.mock("POST", "/api/datasets/acme/readmes/commit/main").with_status(200).create();

        let folder = chunk_folder();
        let hub = HubClient::with_endpoint(server.url(), "hf_test").unwrap();
        assert!(hub.upload_folder(folder.path(), "acme/readmes").is_ok());
        commit.assert();
    }

    #[test]
    fn test_bad_token_is_unauthorized() {
        let mut server = mockito::Server::new();
        let _create = server
            .mock("POST", "/api/repos/create")
            .with_status(401)
            .with_body(r#"{"error":"Invalid credentials in Authorization header"}"#)
            .create();

        let folder = chunk_folder();
        let hub = HubClient::with_endpoint(server.url(), "bad").unwrap();
        let err = hub.upload_folder(folder.path(), "acme/readmes").unwrap_err();
        assert!(matches!(err, RemoteError::Unauthorized { .. }));
        assert!(err.to_string().contains("Invalid credentials"));
    }

    #[test]
    fn test_missing_folder_is_io_error() {
        let hub = HubClient::with_endpoint("http://127.0.0.1:9", "t").unwrap();
        let tmp = TempDir::new().unwrap();
        let err = hub.upload_folder(&tmp.path().join("nope"), "acme/readmes").unwrap_err();
        assert!(matches!(err, RemoteError::Io(_)));
    }
}
