use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lens {
    #[serde(rename = "24mm")]
    Wide24,
    #[serde(rename = "35mm")]
    Normal35,
    #[serde(rename = "85mm")]
    Portrait85,
    #[serde(rename = "100mm_macro")]
    Macro100,
}

impl Lens {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lens::Wide24 => "24mm",
            Lens::Normal35 => "35mm",
            Lens::Portrait85 => "85mm",
            Lens::Macro100 => "100mm_macro",
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ShotSize {
    Wide,
    Medium,
    CloseUp,
    Macro,
}

impl ShotSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShotSize::Wide => "wide",
            ShotSize::Medium => "medium",
            ShotSize::CloseUp => "close-up",
            ShotSize::Macro => "macro",
        }
    }
}

impl fmt::Display for ShotSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the lens cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LensShot {
    pub lens: Lens,
    pub shot_size: ShotSize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub title: String,
    pub description: String,
    pub lens: Lens,
    pub shot_size: ShotSize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VeoPrompt {
    pub prompt: String,
    pub parameters: String,
}

/// The assembled production document for one generated story.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StoryData {
    pub title: String,
    pub setting: String,
    pub role: String,
    pub job_title: String,
    pub wardrobe: String,
    pub narration_script: Vec<String>,
    pub scenes: Vec<Scene>,
    pub veo_prompts: Vec<VeoPrompt>,
    pub music_and_sfx_notes: Vec<String>,
    pub voiceover_direction: Vec<String>,
    pub viral_titles: Vec<String>,
    pub viral_hook: String,
    pub thumbnail_prompt: String,
    pub hashtags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_path: Option<String>,
}
