//! API credentials from the environment.

use crate::domain::Provider;
use crate::error::ConfigError;
use std::env;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const HUGGINGFACEHUB_API_TOKEN: &str = "HUGGINGFACEHUB_API_TOKEN";
pub const HF_TOKEN: &str = "HF_TOKEN";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    /// Inference endpoint token, separate from the dataset upload token.
    pub huggingface_api_token: Option<String>,
    pub hf_token: Option<String>,
    pub github_token: Option<String>,
}

impl Credentials {
    /// Read credentials from the process environment after loading `.env`
    /// from the working directory, if present. Variables already set win.
    pub fn from_env() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(err) if err.not_found() => {}
            Err(err) => tracing::warn!("Failed to load .env: {}", err),
        }
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Self {
        let get = |var: &str| lookup(var).filter(|value| !value.trim().is_empty());
        Self {
            openai_api_key: get(OPENAI_API_KEY),
            gemini_api_key: get(GEMINI_API_KEY),
            huggingface_api_token: get(HUGGINGFACEHUB_API_TOKEN),
            hf_token: get(HF_TOKEN),
            github_token: get(GITHUB_TOKEN),
        }
    }

    pub fn require_openai(&self) -> Result<&str, ConfigError> {
        require(&self.openai_api_key, OPENAI_API_KEY)
    }

    pub fn require_gemini(&self) -> Result<&str, ConfigError> {
        require(&self.gemini_api_key, GEMINI_API_KEY)
    }

    pub fn require_huggingface(&self) -> Result<&str, ConfigError> {
        require(&self.huggingface_api_token, HUGGINGFACEHUB_API_TOKEN)
    }

    pub fn require_hf(&self) -> Result<&str, ConfigError> {
        require(&self.hf_token, HF_TOKEN)
    }

    /// Key for the configured completion provider.
    pub fn require_provider(&self, provider: Provider) -> Result<&str, ConfigError> {
        match provider {
            Provider::OpenAi => self.require_openai(),
            Provider::Gemini => self.require_gemini(),
            Provider::HuggingFace => self.require_huggingface(),
        }
    }
}

fn require<'a>(value: &'a Option<String>, var: &'static str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or(ConfigError::MissingCredential { var })
}
