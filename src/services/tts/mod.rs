use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::core::config::Config;
use crate::core::error::StoryError;

pub mod gemini;

use gemini::GeminiTtsConfig;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AudioConfig {
    /// Whether the narration is synthesized after the story is written.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_tts_provider")]
    pub provider: String,
    #[serde(default)]
    pub gemini: GeminiTtsConfig,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            provider: default_tts_provider(),
            gemini: GeminiTtsConfig::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}
fn default_tts_provider() -> String {
    "gemini".to_string()
}

/// Speech synthesis capability.
#[async_trait]
pub trait TtsClient: Send + Sync + Debug {
    /// Returns raw signed 16-bit little-endian mono PCM at 24 kHz.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;

    fn voice_name(&self) -> &str;
}

pub fn create_tts_client(config: &Config) -> Result<Box<dyn TtsClient>> {
    match config.audio.provider.as_str() {
        "gemini" => {
            let cfg = &config.audio.gemini;
            // Falls back to the text model's key so one credential covers both.
            let explicit = cfg
                .api_key
                .as_deref()
                .or_else(|| config.llm.gemini.as_ref().and_then(|g| g.api_key.as_deref()));
            let api_key = Config::gemini_api_key(explicit)?;
            Ok(Box::new(gemini::GeminiTtsClient::new(&api_key, cfg)))
        }
        other => Err(StoryError::Config(format!("Unknown TTS provider: {}", other)).into()),
    }
}
