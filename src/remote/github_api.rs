//! GitHub REST client for repository search and remote records.

use crate::domain::{RepoRecord, ScanRules, TreeNode};
use crate::error::RemoteError;
use crate::remote::retry::Sleeper;
use crate::remote::{error_message, http_client};
use crate::scan::classify::is_excluded_name;
use crate::utils::decode_lossy;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;

pub const GITHUB_API_URL: &str = "https://api.github.com";
pub const PER_PAGE: usize = 100;
/// Pause between search pages and between repositories.
pub const REQUEST_PAUSE: Duration = Duration::from_secs(1);
const SERVICE: &str = "github";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    #[serde(default)]
    pub stargazers_count: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<RepoSummary>,
}

#[derive(Deserialize)]
struct ContentEntry {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Deserialize)]
struct ReadmeResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

pub struct GitHubApi {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubApi {
    pub fn new(token: Option<String>) -> Result<Self, RemoteError> {
        Self::with_base_url(GITHUB_API_URL, token)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client: http_client(SERVICE)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// API URL with each segment percent-encoded, so names like `C#` survive.
    fn url<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| RemoteError::decode(SERVICE, format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::decode(SERVICE, "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments.into_iter().filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().map_err(|e| RemoteError::transport(SERVICE, e))?;
        parse_json(response)
    }

    /// Repositories matching `query`, most-starred first, at most `max`.
    pub fn search_repos(
        &self,
        query: &str,
        max: usize,
        sleeper: &dyn Sleeper,
    ) -> Result<Vec<RepoSummary>, RemoteError> {
        let mut repos = Vec::new();
        let mut page = 1usize;

        while repos.len() < max {
            if page > 1 {
                sleeper.sleep(REQUEST_PAUSE);
            }
            let request = self.get(self.url(["search", "repositories"])?).query(&[
                ("q", query.to_string()),
                ("sort", "stars".to_string()),
                ("order", "desc".to_string()),
                ("per_page", PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            let response: SearchResponse = self.send_json(request)?;
            let fetched = response.items.len();
            tracing::debug!("Search page {} returned {} repositories", page, fetched);

            repos.extend(response.items.into_iter().take(max - repos.len()));
            if fetched < PER_PAGE {
                break;
            }
            page += 1;
        }

        tracing::info!("Found {} repositories for '{}'", repos.len(), query);
        Ok(repos)
    }

    /// Directory structure of a remote repository, filtered like a local walk.
    pub fn get_tree(&self, full_name: &str, rules: &ScanRules) -> Result<TreeNode, RemoteError> {
        let name = full_name.rsplit('/').next().unwrap_or(full_name).to_string();
        let children = self.get_contents(full_name, "", rules)?;
        Ok(TreeNode::Directory { name, children })
    }

    fn get_contents(
        &self,
        full_name: &str,
        path: &str,
        rules: &ScanRules,
    ) -> Result<Vec<TreeNode>, RemoteError> {
        let segments = std::iter::once("repos")
            .chain(full_name.split('/'))
            .chain(std::iter::once("contents"))
            .chain(path.split('/'));
        let mut entries: Vec<ContentEntry> = self.send_json(self.get(self.url(segments)?))?;
        entries.retain(|entry| {
            let is_dir = entry.kind == "dir";
            match entry.kind.as_str() {
                "dir" | "file" => {
                    !rules.skips(&entry.name, is_dir)
                        && (is_dir || !is_excluded_name(&entry.name, rules))
                }
                _ => false,
            }
        });
        entries.sort_by(|a, b| (b.kind == "dir").cmp(&(a.kind == "dir")).then(a.name.cmp(&b.name)));

        let mut nodes = Vec::with_capacity(entries.len());
        for entry in entries {
            if entry.kind == "dir" {
                let children = self.get_contents(full_name, &entry.path, rules)?;
                nodes.push(TreeNode::Directory { name: entry.name, children });
            } else {
                nodes.push(TreeNode::File { name: entry.name });
            }
        }
        Ok(nodes)
    }

    /// Decoded README text, empty when the repository has none.
    pub fn get_readme(&self, full_name: &str) -> Result<String, RemoteError> {
        let response = self
            .get(self.url(std::iter::once("repos").chain(full_name.split('/')).chain(["readme"]))?)
            .send()
            .map_err(|e| RemoteError::transport(SERVICE, e))?;
        if response.status().as_u16() == 404 {
            tracing::debug!("{} has no README", full_name);
            return Ok(String::new());
        }
        let readme: ReadmeResponse = parse_json(response)?;
        if readme.encoding != "base64" {
            return Err(RemoteError::decode(
                SERVICE,
                format!("unsupported README encoding '{}'", readme.encoding),
            ));
        }

        let packed: String = readme.content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(packed)
            .map_err(|e| RemoteError::decode(SERVICE, format!("invalid base64 README: {e}")))?;
        Ok(decode_lossy(&bytes))
    }

    /// Aggregated record for a remote repository. Key snippets are not fetched.
    pub fn repo_record(&self, full_name: &str, rules: &ScanRules) -> Result<RepoRecord, RemoteError> {
        Ok(RepoRecord {
            repo_id: full_name.to_string(),
            file_structure: self.get_tree(full_name, rules)?,
            readme_content: self.get_readme(full_name)?,
            key_snippets: BTreeMap::new(),
        })
    }
}

fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let status = response.status();
    let text = response.text().map_err(|e| RemoteError::transport(SERVICE, e))?;
    if !status.is_success() {
        return Err(RemoteError::from_status(SERVICE, status.as_u16(), error_message(text)));
    }
    serde_json::from_str(&text)
        .map_err(|e| RemoteError::decode(SERVICE, format!("invalid JSON: {e}")))
}
