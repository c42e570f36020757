//! Remote services: completion models, the GitHub API and the dataset hub.
//!
//! Everything here is blocking; callers run one request at a time.

use crate::error::RemoteError;
use reqwest::blocking::Client;
use std::time::Duration;

pub mod github_api;
pub mod hub;
pub mod llm;
pub mod retry;

pub use github_api::GitHubApi;
pub use hub::{DatasetUploader, HubClient};
pub use llm::{build_client, CompletionClient, ReadmeGenerator};
pub use retry::{RetryPolicy, Sleeper, ThreadSleeper};

const USER_AGENT: &str = concat!("readme-gen/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub(crate) fn http_client(service: &str) -> Result<Client, RemoteError> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| RemoteError::transport(service, e))
}

/// Pull the message out of a JSON error body (`error.message`, `error` or
/// `message`), else return the body.
pub(crate) fn error_message(body: String) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) else {
        return body;
    };
    let message = match value.get("error") {
        Some(serde_json::Value::String(s)) => Some(s.as_str()),
        Some(error) => error.get("message").and_then(|m| m.as_str()),
        None => value.get("message").and_then(|m| m.as_str()),
    };
    match message {
        Some(message) => message.to_string(),
        None => body,
    }
}
