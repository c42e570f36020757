//! Completion clients and README generation.

use crate::chunk::assemble;
use crate::domain::{Config, LoadedContent, Provider, SplitPolicy};
use crate::error::RemoteError;
use crate::remote::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::remote::{error_message, http_client};
use crate::render::prompt::{readme_prompt, SYSTEM_PROMPT};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_DEFAULT_MODEL: &str = "gemini-pro";
pub const HUGGINGFACE_API_URL: &str = "https://api-inference.huggingface.co";
pub const HUGGINGFACE_DEFAULT_MODEL: &str = "mistralai/Mixtral-8x7B-Instruct-v0.1";

/// A hosted chat/completion model.
pub trait CompletionClient {
    /// Generate text for `prompt` under the `system` instruction.
    fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError>;
}

/// Sampling settings shared by the live clients.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

// ---------------------------------------------------------------------------
// OpenAI-compatible chat completions

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    settings: ModelSettings,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: ModelSettings,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client: http_client("openai")?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            settings,
        })
    }
}

impl CompletionClient for OpenAiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError> {
        const SERVICE: &str = "openai";
        let body = ChatRequest {
            model: &self.settings.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_output_tokens,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(|e| RemoteError::transport(SERVICE, e))?;

        let status = response.status();
        let text = response.text().map_err(|e| RemoteError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(RemoteError::from_status(SERVICE, status.as_u16(), error_message(text)));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteError::decode(SERVICE, format!("invalid JSON: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| RemoteError::decode(SERVICE, "response has no message content"))
    }
}

// ---------------------------------------------------------------------------
// Gemini generateContent

pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    settings: ModelSettings,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        settings: ModelSettings,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client: http_client("gemini")?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            settings,
        })
    }
}

impl CompletionClient for GeminiClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError> {
        const SERVICE: &str = "gemini";
        let body = GenerateRequest {
            system_instruction: GeminiContent { role: None, parts: vec![GeminiPart { text: system }] },
            contents: vec![GeminiContent {
                role: Some("user"),
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.settings.temperature,
                max_output_tokens: self.settings.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.settings.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .map_err(|e| RemoteError::transport(SERVICE, e))?;

        let status = response.status();
        let text = response.text().map_err(|e| RemoteError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(RemoteError::from_status(SERVICE, status.as_u16(), error_message(text)));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| RemoteError::decode(SERVICE, format!("invalid JSON: {e}")))?;
        let content = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| RemoteError::decode(SERVICE, "response has no candidates"))?;
        Ok(content.parts.into_iter().map(|part| part.text).collect())
    }
}

// ---------------------------------------------------------------------------
// Hugging Face text-generation inference

pub struct HuggingFaceClient {
    client: Client,
    base_url: String,
    api_token: String,
    settings: ModelSettings,
}

#[derive(Serialize)]
struct TextGenerationRequest {
    inputs: String,
    parameters: TextGenerationParameters,
    options: TextGenerationOptions,
}

#[derive(Serialize)]
struct TextGenerationParameters {
    temperature: f32,
    max_new_tokens: u32,
    return_full_text: bool,
}

#[derive(Serialize)]
struct TextGenerationOptions {
    wait_for_model: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    #[serde(default)]
    generated_text: String,
}

impl HuggingFaceClient {
    pub fn new(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        settings: ModelSettings,
    ) -> Result<Self, RemoteError> {
        Ok(Self {
            client: http_client("huggingface")?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token: api_token.into(),
            settings,
        })
    }
}

/// Mixtral instruction template; the endpoint takes a single text input.
fn instruct_prompt(system: &str, prompt: &str) -> String {
    format!("<s>[INST] {}\n\n{} [/INST]", system.trim(), prompt)
}

impl CompletionClient for HuggingFaceClient {
    fn complete(&self, system: &str, prompt: &str) -> Result<String, RemoteError> {
        const SERVICE: &str = "huggingface";
        let body = TextGenerationRequest {
            inputs: instruct_prompt(system, prompt),
            parameters: TextGenerationParameters {
                temperature: self.settings.temperature,
                max_new_tokens: self.settings.max_output_tokens,
                return_full_text: false,
            },
            options: TextGenerationOptions { wait_for_model: true },
        };

        let response = self
            .client
            .post(format!("{}/models/{}", self.base_url, self.settings.model))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .map_err(|e| RemoteError::transport(SERVICE, e))?;

        let status = response.status();
        let text = response.text().map_err(|e| RemoteError::transport(SERVICE, e))?;
        if !status.is_success() {
            return Err(RemoteError::from_status(SERVICE, status.as_u16(), error_message(text)));
        }

        let parsed: Vec<GeneratedText> = serde_json::from_str(&text)
            .map_err(|e| RemoteError::decode(SERVICE, format!("invalid JSON: {e}")))?;
        parsed
            .into_iter()
            .next()
            .map(|generated| generated.generated_text)
            .ok_or_else(|| RemoteError::decode(SERVICE, "response has no generated text"))
    }
}

/// Build the live client for the configured provider.
pub fn build_client(
    config: &Config,
    api_key: &str,
) -> Result<Box<dyn CompletionClient>, RemoteError> {
    let default_model = match config.provider {
        Provider::OpenAi => OPENAI_DEFAULT_MODEL,
        Provider::Gemini => GEMINI_DEFAULT_MODEL,
        Provider::HuggingFace => HUGGINGFACE_DEFAULT_MODEL,
    };
    let settings = ModelSettings {
        model: config.model.clone().unwrap_or_else(|| default_model.to_string()),
        temperature: config.temperature,
        max_output_tokens: config.max_output_tokens,
    };

    Ok(match config.provider {
        Provider::OpenAi => {
            let base = config.api_base_url.as_deref().unwrap_or(OPENAI_API_URL);
            Box::new(OpenAiClient::new(base, api_key, settings)?)
        }
        Provider::Gemini => {
            let base = config.api_base_url.as_deref().unwrap_or(GEMINI_API_URL);
            Box::new(GeminiClient::new(base, api_key, settings)?)
        }
        Provider::HuggingFace => {
            let base = config.api_base_url.as_deref().unwrap_or(HUGGINGFACE_API_URL);
            Box::new(HuggingFaceClient::new(base, api_key, settings)?)
        }
    })
}

// ---------------------------------------------------------------------------
// README generation

/// Turns repository contents into a README through a completion client.
pub struct ReadmeGenerator {
    client: Box<dyn CompletionClient>,
    policy: RetryPolicy,
    sleeper: Box<dyn Sleeper>,
    chunk_chars: usize,
    split_policy: SplitPolicy,
}

impl ReadmeGenerator {
    pub fn new(client: Box<dyn CompletionClient>) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
            sleeper: Box::new(ThreadSleeper),
            chunk_chars: Config::default().chunk_chars,
            split_policy: SplitPolicy::CharSlice,
        }
    }

    pub fn from_config(client: Box<dyn CompletionClient>, config: &Config) -> Self {
        Self::new(client)
            .retry_policy(RetryPolicy::new(
                config.retry_max_attempts,
                Duration::from_secs(config.retry_delay_secs),
            ))
            .chunking(config.chunk_chars, config.split_policy)
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn sleeper(mut self, sleeper: Box<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn chunking(mut self, chunk_chars: usize, split_policy: SplitPolicy) -> Self {
        self.chunk_chars = chunk_chars;
        self.split_policy = split_policy;
        self
    }

    /// One completion per assembled chunk, responses joined by newlines.
    pub fn generate(
        &self,
        contents: &[LoadedContent],
        tree: Option<&str>,
    ) -> Result<String, RemoteError> {
        let chunks = assemble(contents, self.chunk_chars, self.split_policy);
        if chunks.is_empty() {
            return Err(RemoteError::EmptyInput);
        }

        let total = chunks.len();
        tracing::info!("Generating README from {} chunk(s)", total);

        let mut sections = Vec::with_capacity(total);
        for (idx, chunk) in chunks.iter().enumerate() {
            let prompt = readme_prompt(chunk, idx + 1, total, tree);
            let text = self.policy.run(self.sleeper.as_ref(), |attempt| {
                tracing::debug!("Completion for chunk {}/{} (attempt {})", idx + 1, total, attempt);
                self.client.complete(SYSTEM_PROMPT, &prompt)
            })?;
            sections.push(text.trim().to_string());
        }

        Ok(sections.join("\n"))
    }
}
