use anyhow::{Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::StoryError;
use crate::services::llm::LlmConfig;
use crate::services::tts::AudioConfig;

pub const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output_folder: String,

    #[serde(default)]
    pub unattended: bool,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub audio: AudioConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_folder: default_output(),
            unattended: false,
            llm: LlmConfig::default(),
            audio: AudioConfig::default(),
        }
    }
}

fn default_output() -> String {
    "output".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// A missing file yields the defaults; credentials can still come from the environment.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("{} not found, using default settings", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = serde_yaml_ng::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }

    /// Resolves the Gemini credential: explicit value first, then `GEMINI_API_KEY`, then `API_KEY`.
    pub fn gemini_api_key(explicit: Option<&str>) -> Result<String> {
        Ok(resolve_api_key(explicit, |var| std::env::var(var).ok())?)
    }
}

fn resolve_api_key<F>(explicit: Option<&str>, env: F) -> Result<String, StoryError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }
    ["GEMINI_API_KEY", "API_KEY"]
        .into_iter()
        .filter_map(|var| env(var))
        .find(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            StoryError::Config(
                "Gemini API key is not configured (set llm.gemini.api_key or GEMINI_API_KEY)"
                    .to_string(),
            )
        })
}
