//! Plain-text renderings of a story: the full production document and the
//! per-section files.

use crate::core::catalog::NEGATIVE_PROMPTS;
use crate::core::state::StoryData;

pub const SAFETY_DISCLAIMER: &str = "This story and all visual elements are fictional. No real locations, persons, or organizations are depicted. All AI generations follow content safety standards.";

const EXPORT_CONTROLS: [&str; 4] = [
    "Copy to Notion Template",
    "Export as Veo 3 Prompt Bundle",
    "Download PDF for Production",
    "Copy to Clipboard",
];

/// The narration as read aloud; also the TTS input.
pub fn narration_text(story: &StoryData) -> String {
    story.narration_script.join("\n\n")
}

fn b_roll_plan(story: &StoryData) -> String {
    story
        .scenes
        .iter()
        .enumerate()
        .map(|(i, s)| {
            format!(
                "Scene {:02} — {}\nDescription: {} [{}]",
                i + 1,
                s.title,
                s.description,
                s.lens
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn hashtag_line(story: &StoryData) -> String {
    story
        .hashtags
        .iter()
        .map(|h| format!("#{}", h.strip_prefix('#').unwrap_or(h)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// The complete ten-section production document.
pub fn format_story(story: &StoryData) -> String {
    let mut text = format!("🎬 Rule-Based Horror Story – {}\n\n", story.title);

    text.push_str(&format!(
        "🧩 SECTION 1: Story Script (Narration Format)\n🎙 NARRATION SCRIPT\n{}\n\n",
        narration_text(story)
    ));

    text.push_str(&format!(
        "🎞 SECTION 2: Scene-by-Scene B-Roll Plan\n{}\n\n",
        b_roll_plan(story)
    ));

    let prompts = story
        .veo_prompts
        .iter()
        .enumerate()
        .map(|(i, p)| format!("Prompt {}:\n{}\nParameters:\n{}", i + 1, p.prompt, p.parameters))
        .collect::<Vec<_>>()
        .join("\n\n");
    text.push_str(&format!(
        "🖼 SECTION 3: Veo 3 Image Prompts (Optimized)\n{}\n\n",
        prompts
    ));

    text.push_str(&format!(
        "🎵 SECTION 4: Music + SFX Design Notes\n{}\n\n",
        story.music_and_sfx_notes.join("\n")
    ));

    text.push_str(&format!(
        "🔊 SECTION 5: Voiceover Direction\n{}\n\n",
        story.voiceover_direction.join("\n")
    ));

    text.push_str(&format!(
        "🧠 SECTION 6: Viral Title + Hook Options\nTitles:\n{}\n\nHook Rewrite:\n{}\n\n",
        story.viral_titles.join("\n"),
        story.viral_hook
    ));

    text.push_str(&format!(
        "🧩 SECTION 7: Thumbnail Prompt\n{}\n\n",
        story.thumbnail_prompt
    ));

    text.push_str(&format!(
        "⚠️ SECTION 8: Safety Disclaimer\n{}\n\n",
        SAFETY_DISCLAIMER
    ));

    let controls = EXPORT_CONTROLS
        .iter()
        .map(|c| format!("[ ] {}", c))
        .collect::<Vec<_>>()
        .join("\n");
    text.push_str(&format!("🧭 SECTION 9: Export Controls\n{}\n\n", controls));

    text.push_str(&format!(
        "SECTION 10: Viral Hashtags\n{}\n",
        hashtag_line(story)
    ));

    text
}

/// Per-section downloads as `(file name, contents)` pairs.
pub fn section_files(story: &StoryData) -> Vec<(&'static str, String)> {
    let veo_bundle = story
        .veo_prompts
        .iter()
        .enumerate()
        .map(|(i, p)| {
            format!(
                "Prompt {}:\n{}\n\nParameters:\n{}\n\nNegative Prompts:\n{}",
                i + 1,
                p.prompt,
                p.parameters,
                NEGATIVE_PROMPTS
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    vec![
        ("01_Narration_Script.txt", narration_text(story)),
        ("02_B-Roll_Plan.txt", b_roll_plan(story)),
        ("03_Veo_Prompts.txt", veo_bundle),
        ("04_Music_SFX_Notes.txt", story.music_and_sfx_notes.join("\n")),
        ("05_Voiceover_Direction.txt", story.voiceover_direction.join("\n")),
        (
            "06_Viral_Content.txt",
            format!(
                "10 Title Options:\n{}\n\nHook Rewrite (First 5 seconds):\n\"{}\"",
                story.viral_titles.join("\n"),
                story.viral_hook
            ),
        ),
        ("07_Thumbnail_Prompt.txt", story.thumbnail_prompt.clone()),
        ("10_Viral_Hashtags.txt", hashtag_line(story)),
    ]
}

/// Directory-safe name derived from the story title.
pub fn slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug
    }
}
