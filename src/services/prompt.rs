use rand::Rng;
use serde_json::{json, Value};

use crate::core::catalog::{role_profile, RoleProfile, ROLE_PROFILES, SETTINGS};

/// Story generation samples at maximum diversity.
pub const STORY_TEMPERATURE: f32 = 1.0;

pub const CHARACTER_DESCRIPTION: &str =
    "Southeast Asian male, early 40s, short black hair, gaunt, tired eyes, moody silhouette";

/// The randomized parameters of one story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryRequest {
    pub setting: &'static str,
    pub profile: RoleProfile,
    pub character_id: u8,
}

impl StoryRequest {
    /// Returns `None` when the setting is not in the catalog.
    pub fn new(setting: &str, character_id: u8) -> Option<Self> {
        let setting = SETTINGS.iter().copied().find(|s| *s == setting)?;
        let profile = *role_profile(setting)?;
        Some(Self {
            setting,
            profile,
            character_id,
        })
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let (setting, profile) = ROLE_PROFILES[rng.random_range(0..ROLE_PROFILES.len())];
        let character_id = rng.random_range(1..=99);
        Self {
            setting,
            profile,
            character_id,
        }
    }

    /// e.g. `Operator #7`
    pub fn character_identifier(&self) -> String {
        format!("{} #{}", self.profile.job_title, self.character_id)
    }
}

pub fn build_prompt(request: &StoryRequest) -> String {
    format!(
        "You are an elite cinematic scriptwriter specializing in psychological horror for TikTok, creating a \"rule-based\" scenario.\n\
Generate a complete studio-ready script and production plan based on the following parameters:\n\
- Setting: {setting}\n\
- Role: {role}\n\
- Character: {character}.\n\
\n\
Your output MUST be a valid JSON object. Do not include any markdown formatting like ```json.\n\
\n\
The JSON object must conform to this schema:\n\
{{\n\
  \"title\": \"A short, ominous, cinematic title.\",\n\
  \"rules\": [\"An array of exactly 8 short, imperative rules. Do NOT include prefixes like 'Rule 1:'. Just provide the rule text. The rules should escalate from mild unease to hopelessness. Each rule is a string.\"],\n\
  \"scene_concepts\": [\"An array of exactly 24 brief, evocative scene concepts, 3 for each of the 8 rules. These should describe an action or a visual related to the corresponding rule.\"],\n\
  \"viral_titles\": [\"An array of 10 short, ominous, headline-style titles for social media.\"],\n\
  \"viral_hook\": \"A 1-2 sentence hook for the first 5 seconds of the video, based on the story.\",\n\
  \"hashtags\": [\"An array of 10 relevant hashtags.\"]\n\
}}\n\
\n\
Follow these constraints for the content:\n\
- The total narration (the 8 rules) must be 120-165 words.\n\
- The tone must be eerie, cinematic, and psychological, not gory.\n",
        setting = request.setting,
        role = request.profile.role,
        character = CHARACTER_DESCRIPTION,
    )
}

/// Structured-output schema sent alongside the prompt.
pub fn response_schema() -> Value {
    let string_array = json!({ "type": "ARRAY", "items": { "type": "STRING" } });
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "rules": string_array,
            "scene_concepts": string_array,
            "viral_titles": string_array,
            "viral_hook": { "type": "STRING" },
            "hashtags": string_array,
        },
        "required": ["title", "rules", "scene_concepts", "viral_titles", "viral_hook", "hashtags"],
    })
}
