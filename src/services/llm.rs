use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

use crate::core::config::Config;
use crate::core::error::StoryError;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    pub gemini: Option<GeminiConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            gemini: Some(GeminiConfig::default()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
pub(crate) fn default_base_url() -> String {
    GEMINI_API_BASE.to_string()
}

/// A structured-output generation request.
#[derive(Debug, Clone)]
pub struct TextRequest {
    pub prompt: String,
    pub response_schema: Value,
    pub temperature: f32,
}

/// Text generation capability.
#[async_trait]
pub trait LlmClient: Send + Sync + Debug {
    /// Returns the raw text of the model's reply.
    async fn generate(&self, request: &TextRequest) -> Result<String>;
}

pub fn create_llm(config: &Config) -> Result<Box<dyn LlmClient>> {
    match config.llm.provider.as_str() {
        "gemini" => {
            let cfg = config.llm.gemini.clone().unwrap_or_default();
            let api_key = Config::gemini_api_key(cfg.api_key.as_deref())?;
            Ok(Box::new(GeminiClient::new(&api_key, &cfg.model, &cfg.base_url)))
        }
        other => Err(StoryError::Config(format!("Unknown LLM provider: {}", other)).into()),
    }
}

/// Builds `{base}/models/{model}:generateContent?key=...`.
pub(crate) fn gemini_endpoint(base_url: &str, model: &str, api_key: &str) -> Result<url::Url> {
    let raw = format!(
        "{}/models/{}:generateContent",
        base_url.trim_end_matches('/'),
        model
    );
    url::Url::parse_with_params(&raw, &[("key", api_key)])
        .with_context(|| format!("Invalid Gemini endpoint: {}", raw))
}

// --- Gemini ---

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'static str,
    response_schema: &'a Value,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContentResponse>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GeminiError {
    pub(crate) message: String,
}

impl GeminiResponse {
    fn into_text(self) -> Result<String, StoryError> {
        if let Some(err) = self.error {
            return Err(StoryError::Upstream(format!(
                "Gemini API returned error: {}",
                err.message
            )));
        }

        let first = self
            .candidates
            .and_then(|c| c.into_iter().next())
            .ok_or_else(|| StoryError::Upstream("Gemini response has no candidates".to_string()))?;

        let text: String = first
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = first.finish_reason.as_deref().unwrap_or("UNKNOWN");
            return Err(StoryError::Upstream(format!(
                "Gemini response empty. Finish reason: {}",
                reason
            )));
        }
        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: &TextRequest) -> Result<String> {
        let url = gemini_endpoint(&self.base_url, &self.model, &self.api_key)?;

        let request_body = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
                temperature: request.temperature,
            },
        };

        debug!("Requesting story from model {}", self.model);
        let resp = self
            .client
            .post(url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| StoryError::Upstream(format!("Gemini request failed: {}", e)))?;

        let status = resp.status();
        let response_text = resp
            .text()
            .await
            .map_err(|e| StoryError::Upstream(format!("Gemini response unreadable: {}", e)))?;

        if !status.is_success() {
            return Err(StoryError::Upstream(format!(
                "Gemini API error ({}): {}",
                status, response_text
            ))
            .into());
        }

        let result: GeminiResponse = serde_json::from_str(&response_text).map_err(|e| {
            StoryError::Upstream(format!(
                "Failed to parse Gemini response: {}. Body: {}",
                e, response_text
            ))
        })?;

        Ok(result.into_text()?)
    }
}
