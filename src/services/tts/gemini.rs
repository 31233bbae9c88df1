use anyhow::Result;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::error::StoryError;
use crate::services::llm::{default_base_url, gemini_endpoint, GeminiError};
use crate::services::tts::TtsClient;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeminiTtsConfig {
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for GeminiTtsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            voice: default_voice(),
            base_url: default_base_url(),
        }
    }
}

fn default_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}
// Clinical, detached delivery.
fn default_voice() -> String {
    "Kore".to_string()
}

#[derive(Debug)]
pub struct GeminiTtsClient {
    api_key: String,
    model: String,
    voice: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiTtsClient {
    pub fn new(api_key: &str, config: &GeminiTtsConfig) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: config.model.clone(),
            voice: config.voice.clone(),
            base_url: config.base_url.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechRequest<'a> {
    contents: Vec<SpeechContent<'a>>,
    generation_config: SpeechGenerationConfig<'a>,
}

#[derive(Serialize)]
struct SpeechContent<'a> {
    parts: Vec<TextPart<'a>>,
}

#[derive(Serialize)]
struct TextPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechGenerationConfig<'a> {
    response_modalities: [&'static str; 1],
    speech_config: SpeechConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig<'a> {
    voice_config: VoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig<'a> {
    prebuilt_voice_config: PrebuiltVoiceConfig<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig<'a> {
    voice_name: &'a str,
}

#[derive(Deserialize)]
struct SpeechResponse {
    candidates: Option<Vec<SpeechCandidate>>,
    error: Option<GeminiError>,
}

#[derive(Deserialize)]
struct SpeechCandidate {
    content: Option<SpeechContentResponse>,
}

#[derive(Deserialize)]
struct SpeechContentResponse {
    #[serde(default)]
    parts: Vec<SpeechPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpeechPart {
    inline_data: Option<InlineData>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String, // base64-encoded PCM
}

impl SpeechResponse {
    /// Decoded PCM of the first candidate's first part.
    fn into_pcm(self) -> Result<Vec<u8>, StoryError> {
        if let Some(err) = self.error {
            return Err(StoryError::Upstream(format!(
                "Gemini API returned error: {}",
                err.message
            )));
        }

        let inline = self
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.inline_data)
            .filter(|d| !d.data.is_empty())
            .ok_or(StoryError::MissingAudio)?;

        if let Some(mime) = &inline.mime_type {
            debug!("Received audio payload ({})", mime);
        }

        STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| StoryError::Upstream(format!("Invalid base64 audio payload: {}", e)))
    }
}

#[async_trait]
impl TtsClient for GeminiTtsClient {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let url = gemini_endpoint(&self.base_url, &self.model, &self.api_key)?;

        let request_body = SpeechRequest {
            contents: vec![SpeechContent {
                parts: vec![TextPart { text }],
            }],
            generation_config: SpeechGenerationConfig {
                response_modalities: ["AUDIO"],
                speech_config: SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig { voice_name: &self.voice },
                    },
                },
            },
        };

        info!("Synthesizing {} characters with voice {}", text.len(), self.voice);
        let resp = self
            .client
            .post(url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| StoryError::Upstream(format!("Gemini TTS request failed: {}", e)))?;

        let status = resp.status();
        let response_text = resp
            .text()
            .await
            .map_err(|e| StoryError::Upstream(format!("Gemini TTS response unreadable: {}", e)))?;

        if !status.is_success() {
            return Err(StoryError::Upstream(format!(
                "Gemini TTS error ({}): {}",
                status, response_text
            ))
            .into());
        }

        let result: SpeechResponse = serde_json::from_str(&response_text).map_err(|e| {
            StoryError::Upstream(format!("Failed to parse Gemini TTS response: {}", e))
        })?;

        Ok(result.into_pcm()?)
    }

    fn voice_name(&self) -> &str {
        &self.voice
    }
}
