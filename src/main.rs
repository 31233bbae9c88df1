use anyhow::Result;
use horror_script::core::config::{Config, CONFIG_FILE};
use horror_script::core::io::FsStorage;
use horror_script::services::llm::create_llm;
use horror_script::services::tts::create_tts_client;
use horror_script::services::workflow::StoryWorkflow;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} [{elapsed}]")?);
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {:#}", e);
            return Err(e);
        }
    };
    if !Path::new(CONFIG_FILE).exists() {
        // Leave a starter file next to the binary so the settings are discoverable.
        config.save()?;
        println!("Wrote default settings to {}", CONFIG_FILE);
    }
    config.ensure_directories()?;

    // Each enabled client needs a credential; a missing one aborts before any call.
    let llm = create_llm(&config)?;
    let tts = if config.audio.enabled {
        Some(create_tts_client(&config)?)
    } else {
        None
    };

    let storage = Arc::new(FsStorage::new(&config.output_folder));
    let mut workflow = StoryWorkflow::new(&config, llm, tts, storage.clone());

    let pb = spinner("Generating cinematic script...")?;
    let result = workflow.generate_story(&mut rand::rng()).await;
    pb.finish_and_clear();

    let story = match result {
        Ok(story) => story,
        Err(e) => {
            eprintln!("{:#}", e);
            return Err(e);
        }
    };
    println!("🎬 Rule-Based Horror Story – {}", story.title);
    println!("   {} as {}", story.setting, story.role);
    if let Some(dir) = workflow.story_dir() {
        println!("Production document written to {}", storage.root().join(dir).display());
    }

    if !workflow.speech_enabled() {
        return Ok(());
    }

    let wants_audio = config.unattended
        || inquire::Confirm::new("Generate narration audio?")
            .with_default(true)
            .prompt()?;
    if !wants_audio {
        return Ok(());
    }

    let pb = spinner("Synthesizing audio...")?;
    let result = workflow.generate_voiceover().await;
    pb.finish_and_clear();

    // The story stands even if narration fails.
    if let Err(e) = result {
        eprintln!("{:#}", e);
    } else if let Some(path) = workflow.story().and_then(|s| s.audio_path.as_deref()) {
        println!("Narration written to {}", path);
    }

    Ok(())
}
