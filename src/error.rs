//! Error types for remote calls and configuration.

use thiserror::Error;

/// Substring the hosted APIs put in quota/rate-limit failures.
pub const RESOURCE_EXHAUSTED_MARKER: &str = "Resource has been exhausted";

#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("rate limited by {service}: {message}")]
    RateLimited { service: String, message: String },

    #[error("authentication failed for {service}: {message}")]
    Unauthorized { service: String, message: String },

    #[error("{service} returned HTTP {status}: {message}")]
    Status { service: String, status: u16, message: String },

    #[error("request to {service} failed")]
    Transport {
        service: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response from {service}: {message}")]
    Decode { service: String, message: String },

    #[error("nothing to send: repository produced no content")]
    EmptyInput,

    #[error("local I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl RemoteError {
    /// True for errors the bounded-retry policy should wait out.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            RemoteError::RateLimited { .. } => true,
            RemoteError::Status { status, message, .. } => {
                *status == 429 || message.contains(RESOURCE_EXHAUSTED_MARKER)
            }
            other => other.to_string().contains(RESOURCE_EXHAUSTED_MARKER),
        }
    }

    pub(crate) fn transport(service: &str, source: reqwest::Error) -> Self {
        RemoteError::Transport { service: service.to_string(), source }
    }

    pub(crate) fn decode(service: &str, message: impl Into<String>) -> Self {
        RemoteError::Decode { service: service.to_string(), message: message.into() }
    }

    /// Map a non-success HTTP status to the matching variant.
    pub(crate) fn from_status(service: &str, status: u16, body: String) -> Self {
        let service = service.to_string();
        match status {
            429 => RemoteError::RateLimited { service, message: body },
            401 | 403 => RemoteError::Unauthorized { service, message: body },
            _ if body.contains(RESOURCE_EXHAUSTED_MARKER) => {
                RemoteError::RateLimited { service, message: body }
            }
            _ => RemoteError::Status { service, status, message: body },
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var} not found. Please set the {var} environment variable (or add it to .env)")]
    MissingCredential { var: &'static str },
}
