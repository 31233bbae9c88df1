use anyhow::Result;
use rand::Rng;
use serde::Deserialize;

use crate::core::catalog::LENS_PATTERN;
use crate::core::error::StoryError;
use crate::core::state::{Scene, StoryData, VeoPrompt};
use crate::services::prompt::{StoryRequest, CHARACTER_DESCRIPTION};

pub const RULE_COUNT: usize = 8;
pub const CONCEPTS_PER_RULE: usize = 3;
pub const SCENE_CONCEPT_COUNT: usize = RULE_COUNT * CONCEPTS_PER_RULE;
pub const SCENE_COUNT: usize = SCENE_CONCEPT_COUNT + 6;

const STYLE_SUFFIX: &str = "cinematic anime style, teal-cyan neon lighting, tungsten accents, volumetric fog, shallow DOF, cinematic realism, film grain, chromatic aberration, scanlines, desaturated tones, soft vignette, moody atmosphere";

pub const MUSIC_AND_SFX_NOTES: [&str; 5] = [
    "Ambient Base: A low, continuous mechanical hum or lab drone in the key of C#.",
    "Transitional Cues: Sudden metallic creaks, a sharp hiss of steam, or faint, distant knocking between rule segments.",
    "Emotional Cues: A subtle, deep bass pulse that slowly rises in intensity and frequency with each rule, peaking at rule 8.",
    "Pacing Bed (Optional): An 85 BPM dark ambient track with a simple, repeating synth line to drive the 60-second flow for TikTok.",
    "Mixing Note: Ensure the Voiceover remains clear and intelligible. Sidechain the pacing bed by -4 dB whenever the narrator speaks.",
];

pub const VOICEOVER_DIRECTION: [&str; 4] = [
    "Tone: Deliver the lines in a calm, detached, almost clinical manner. The voice should feel inhumanly professional.",
    "Pacing: Speak at approximately 70% of a normal pace, leaving deliberate, unnerving pauses between phrases.",
    "Breath Beats: Treat each numbered rule as a separate thought. Take a small, audible breath (100-200 ms) before starting each new rule.",
    "Final Line: The final line, 'Good luck...', should be delivered as a soft, almost inaudible whisper, mixed -6 dB below the main VO level.",
];

/// The story service's reply, before any post-processing.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GeneratedContent {
    pub title: String,
    pub rules: Vec<String>,
    pub scene_concepts: Vec<String>,
    pub viral_titles: Vec<String>,
    pub viral_hook: String,
    pub hashtags: Vec<String>,
}

impl GeneratedContent {
    /// Parses and validates a raw reply. Markdown code fences are tolerated.
    pub fn parse(response: &str) -> Result<Self> {
        let clean_json = strip_code_blocks(response);
        let content: GeneratedContent = serde_json::from_str(&clean_json)
            .map_err(|e| StoryError::MalformedResponse(format!("invalid JSON: {}", e)))?;
        content.validate()?;
        Ok(content)
    }

    pub fn validate(&self) -> Result<(), StoryError> {
        if self.title.trim().is_empty() {
            return Err(StoryError::MalformedResponse("title is empty".to_string()));
        }
        if self.rules.len() != RULE_COUNT {
            return Err(StoryError::MalformedResponse(format!(
                "expected {} rules, got {}",
                RULE_COUNT,
                self.rules.len()
            )));
        }
        if self.scene_concepts.len() != SCENE_CONCEPT_COUNT {
            return Err(StoryError::MalformedResponse(format!(
                "expected {} scene concepts, got {}",
                SCENE_CONCEPT_COUNT,
                self.scene_concepts.len()
            )));
        }
        Ok(())
    }
}

/// Rule number the narration singles out; always one of the last three.
pub fn pick_important_rule<R: Rng + ?Sized>(rng: &mut R) -> usize {
    rng.random_range(RULE_COUNT - 2..=RULE_COUNT)
}

/// Expands a validated reply into the full production document.
pub fn assemble(
    content: GeneratedContent,
    request: &StoryRequest,
    important_rule: usize,
) -> StoryData {
    let narration_script = narration(&content.rules, request, important_rule);
    let scenes = scenes(&content.scene_concepts, request);
    let veo_prompts = scenes.iter().map(|scene| veo_prompt(scene, request)).collect();

    StoryData {
        title: content.title,
        setting: request.setting.to_string(),
        role: request.profile.role.to_string(),
        job_title: request.profile.job_title.to_string(),
        wardrobe: request.profile.wardrobe.to_string(),
        narration_script,
        scenes,
        veo_prompts,
        music_and_sfx_notes: MUSIC_AND_SFX_NOTES.iter().map(|s| s.to_string()).collect(),
        voiceover_direction: VOICEOVER_DIRECTION.iter().map(|s| s.to_string()).collect(),
        viral_titles: content.viral_titles,
        viral_hook: content.viral_hook,
        thumbnail_prompt: thumbnail_prompt(request),
        hashtags: content.hashtags,
        audio_path: None,
    }
}

fn narration(rules: &[String], request: &StoryRequest, important_rule: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(rules.len() + 3);
    lines.push(format!(
        "Congratulations. You've been hired as {} at {}.",
        request.profile.role, request.setting
    ));
    lines.push(format!(
        "Rule No {} is the most important to follow. Pay close attention.",
        important_rule
    ));
    lines.extend(
        rules
            .iter()
            .enumerate()
            .map(|(i, rule)| format!("Rule No {}: {}", i + 1, rule)),
    );
    lines.push(format!(
        "Stay calm. Follow the rules. Good luck, {}.",
        request.profile.job_title
    ));
    lines
}

fn scene(title: impl Into<String>, description: impl Into<String>, pattern_index: usize) -> Scene {
    let pattern = LENS_PATTERN[pattern_index % LENS_PATTERN.len()];
    Scene {
        title: title.into(),
        description: description.into(),
        lens: pattern.lens,
        shot_size: pattern.shot_size,
    }
}

fn scenes(concepts: &[String], request: &StoryRequest) -> Vec<Scene> {
    let character = request.character_identifier();
    let id = request.character_id;
    let mut scenes = Vec::with_capacity(concepts.len() + 6);

    // cold open
    scenes.push(scene(
        "Elevator Arrival",
        format!(
            "teal overhead neon flicker, dense fog, {}'s silhouette entering the main door of the {}, soft tungsten desk lamp pool, shallow DOF, cinematic realism.",
            character, request.setting
        ),
        0,
    ));
    scenes.push(scene(
        "ID Badge Scan",
        format!(
            "{} scans ID badge #{} at a security panel. A green light briefly illuminates his tired face.",
            character, id
        ),
        1,
    ));
    scenes.push(scene(
        "The Empty Workspace",
        "A slow pan across the eerily quiet and empty workspace. A single monitor hums, casting a cyan glow.",
        2,
    ));

    for (index, concept) in concepts.iter().enumerate() {
        scenes.push(scene(
            format!(
                "Rule {} - Scene {}",
                index / CONCEPTS_PER_RULE + 1,
                index % CONCEPTS_PER_RULE + 1
            ),
            concept.as_str(),
            index + 3,
        ));
    }

    // fallout
    scenes.push(scene(
        "A Rule Broken",
        "A piece of equipment malfunctions violently, its warning light flashing a desperate red against the dominant teal.",
        0,
    ));
    scenes.push(scene(
        "Resigned Fear",
        format!(
            "Close up on {}'s face, eyes wide, reflecting the chaos. He is frozen, realizing his mistake.",
            character
        ),
        1,
    ));

    scenes.push(scene(
        "Final Glance",
        format!(
            "Macro shot of the ID badge #{}, slightly askew on his uniform. The name is out of focus, only the number is clear.",
            id
        ),
        2,
    ));

    scenes
}

fn veo_prompt(scene: &Scene, request: &StoryRequest) -> VeoPrompt {
    VeoPrompt {
        prompt: format!(
            "{}, {}. Primary: {}, ID#{}, {}, consistent with {}.",
            scene.description,
            STYLE_SUFFIX,
            primary_character(),
            request.character_id,
            request.profile.wardrobe,
            request.setting
        ),
        parameters: format!(
            "--ar 9:16 --style cinematic --lighting teal_neon --camera {} --grain film --depth shallow --vibe eerie --quality ultra --saturation -15 --contrast +10 --fog moderate --vfx_scanlines subtle",
            scene.lens
        ),
    }
}

// The visual prompts drop the mood words from the character description.
fn primary_character() -> &'static str {
    CHARACTER_DESCRIPTION
        .strip_suffix(", tired eyes, moody silhouette")
        .unwrap_or(CHARACTER_DESCRIPTION)
}

fn thumbnail_prompt(request: &StoryRequest) -> String {
    format!(
        "{} in teal-cyan neon haze, cinematic anime style, warm tungsten pool, {}'s silhouette (male, early 40s, short black hair, ID#{}) half-turned toward camera, monitor glow reflected in eyes, film grain, scanlines, chromatic aberration, shallow DOF, cinematic vignette.",
        request.setting, request.profile.job_title, request.character_id
    )
}

pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json").trim_end_matches("```").trim().to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```").trim_end_matches("```").trim().to_string()
    } else {
        s.to_string()
    }
}
