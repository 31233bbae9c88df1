use anyhow::{Context, Result};
use log::{info, warn};
use rand::Rng;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::error::StoryError;
use crate::core::io::Storage;
use crate::core::state::StoryData;
use crate::services::export::{format_story, narration_text, section_files, slug};
use crate::services::llm::{LlmClient, TextRequest};
use crate::services::prompt::{build_prompt, response_schema, StoryRequest, STORY_TEMPERATURE};
use crate::services::script::{assemble, pick_important_rule, GeneratedContent};
use crate::services::tts::TtsClient;
use crate::utils::audio::{encode_wav, WavHeader};

pub const STORY_JSON: &str = "story.json";
pub const STORY_TEXT: &str = "story.txt";
pub const NARRATION_WAV: &str = "narration.wav";

/// A written narration file. Must be released once superseded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    key: String,
}

impl AudioHandle {
    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Holds the current story and its narration for one session.
pub struct StoryWorkflow {
    llm: Box<dyn LlmClient>,
    tts: Option<Box<dyn TtsClient>>,
    storage: Arc<dyn Storage>,
    story: Option<StoryData>,
    story_dir: Option<String>,
    audio: Option<AudioHandle>,
}

impl StoryWorkflow {
    pub fn new(
        config: &Config,
        llm: Box<dyn LlmClient>,
        tts: Option<Box<dyn TtsClient>>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        let speech = match &tts {
            Some(tts) => format!("{} voice {}", config.audio.provider, tts.voice_name()),
            None => "disabled".to_string(),
        };
        info!(
            "Story workflow ready (text: {}, speech: {}, output: {})",
            config.llm.provider, speech, config.output_folder
        );
        Self {
            llm,
            tts,
            storage,
            story: None,
            story_dir: None,
            audio: None,
        }
    }

    pub fn story(&self) -> Option<&StoryData> {
        self.story.as_ref()
    }

    pub fn speech_enabled(&self) -> bool {
        self.tts.is_some()
    }

    /// Storage key prefix of the current story's artifacts.
    pub fn story_dir(&self) -> Option<&str> {
        self.story_dir.as_deref()
    }

    pub async fn generate_story<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&StoryData> {
        let request = StoryRequest::random(rng);
        let important_rule = pick_important_rule(rng);
        self.generate_story_with(request, important_rule).await
    }

    /// Replaces the current story. Any previous narration is released first.
    pub async fn generate_story_with(
        &mut self,
        request: StoryRequest,
        important_rule: usize,
    ) -> Result<&StoryData> {
        self.release_audio().await.context("Generation failed")?;
        self.story = None;
        self.story_dir = None;

        info!(
            "Generating story: {} as {} ({})",
            request.setting,
            request.profile.role,
            request.character_identifier()
        );

        let text_request = TextRequest {
            prompt: build_prompt(&request),
            response_schema: response_schema(),
            temperature: STORY_TEMPERATURE,
        };
        let reply = self
            .llm
            .generate(&text_request)
            .await
            .context("Generation failed")?;
        let content = GeneratedContent::parse(&reply).context("Generation failed")?;

        let story = assemble(content, &request, important_rule);
        let dir = format!("{}-{:02}", slug(&story.title), request.character_id);
        info!("Assembled \"{}\" with {} scenes", story.title, story.scenes.len());

        self.write_documents(&dir, &story)
            .await
            .context("Generation failed")?;
        self.story_dir = Some(dir);
        Ok(&*self.story.insert(story))
    }

    /// Synthesizes the current narration. Failure leaves the story untouched.
    pub async fn generate_voiceover(&mut self) -> Result<AudioHandle> {
        let (story, dir) = match (&self.story, &self.story_dir) {
            (Some(story), Some(dir)) => (story, dir.clone()),
            _ => {
                return Err(anyhow::Error::new(StoryError::NoStory))
                    .context("Voice generation failed");
            }
        };
        let Some(tts) = self.tts.as_ref() else {
            return Err(anyhow::Error::new(StoryError::Config(
                "speech synthesis is disabled".to_string(),
            )))
            .context("Voice generation failed");
        };

        let text = narration_text(story);
        let pcm = tts
            .synthesize(&text)
            .await
            .context("Voice generation failed")?;

        let wav = encode_wav(&pcm).context("Voice generation failed")?;
        if let Ok(header) = WavHeader::parse(&wav) {
            info!("Narration is {:.1}s of audio", header.duration_secs());
        }

        self.release_audio().await.context("Voice generation failed")?;

        let key = format!("{}/{}", dir, NARRATION_WAV);
        self.storage
            .write(&key, &wav)
            .await
            .context("Voice generation failed")?;
        let handle = AudioHandle { key };

        let location = self.storage.locate(handle.key()).display().to_string();
        if let Some(story) = self.story.as_mut() {
            story.audio_path = Some(location);
        }
        self.audio = Some(handle.clone());
        self.save_story_json()
            .await
            .context("Voice generation failed")?;

        Ok(handle)
    }

    /// Deletes the current narration file, if any.
    pub async fn release_audio(&mut self) -> Result<()> {
        let Some(handle) = self.audio.take() else {
            return Ok(());
        };
        if let Err(e) = self.storage.delete(handle.key()).await {
            warn!("Failed to release audio {}: {}", handle.key(), e);
            self.audio = Some(handle);
            return Err(e);
        }
        if let Some(story) = self.story.as_mut() {
            story.audio_path = None;
        }
        Ok(())
    }

    async fn write_documents(&self, dir: &str, story: &StoryData) -> Result<()> {
        self.storage
            .write(
                &format!("{}/{}", dir, STORY_JSON),
                serde_json::to_string_pretty(story)?.as_bytes(),
            )
            .await?;
        self.storage
            .write(&format!("{}/{}", dir, STORY_TEXT), format_story(story).as_bytes())
            .await?;
        for (name, contents) in section_files(story) {
            self.storage
                .write(&format!("{}/{}", dir, name), contents.as_bytes())
                .await?;
        }
        Ok(())
    }

    async fn save_story_json(&self) -> Result<()> {
        if let (Some(story), Some(dir)) = (&self.story, &self.story_dir) {
            self.storage
                .write(
                    &format!("{}/{}", dir, STORY_JSON),
                    serde_json::to_string_pretty(story)?.as_bytes(),
                )
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::FsStorage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct MockLlmClient {
        reply: String,
        call_count: Arc<Mutex<usize>>,
        last_prompt: Arc<Mutex<Option<String>>>,
    }

    impl MockLlmClient {
        fn new(reply: String) -> Self {
            Self {
                reply,
                call_count: Arc::new(Mutex::new(0)),
                last_prompt: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn generate(&self, request: &TextRequest) -> Result<String> {
            *self.call_count.lock().unwrap() += 1;
            *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
            assert_eq!(request.temperature, 1.0);
            Ok(self.reply.clone())
        }
    }

    #[derive(Debug)]
    struct MockTtsClient {
        should_fail: bool,
        last_text: Arc<Mutex<Option<String>>>,
    }

    impl MockTtsClient {
        fn new(should_fail: bool) -> Self {
            Self {
                should_fail,
                last_text: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl TtsClient for MockTtsClient {
        async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            *self.last_text.lock().unwrap() = Some(text.to_string());
            if self.should_fail {
                Err(StoryError::MissingAudio.into())
            } else {
                Ok(vec![0u8; 480])
            }
        }

        fn voice_name(&self) -> &str {
            "mock"
        }
    }

    fn reply(rules: usize, concepts: usize) -> String {
        serde_json::json!({
            "title": "The Scale Never Lies",
            "rules": (1..=rules).map(|i| format!("Rule text {}.", i)).collect::<Vec<_>>(),
            "scene_concepts": (1..=concepts).map(|i| format!("Concept {}", i)).collect::<Vec<_>>(),
            "viral_titles": ["Don't weigh it"],
            "viral_hook": "The scale knows.",
            "hashtags": ["horror"],
        })
        .to_string()
    }

    fn weigh_station() -> StoryRequest {
        StoryRequest::new("a remote desert weigh-station", 7).unwrap()
    }

    fn workflow(
        root: &std::path::Path,
        llm: MockLlmClient,
        tts: MockTtsClient,
    ) -> StoryWorkflow {
        let config = Config {
            output_folder: root.to_string_lossy().to_string(),
            ..Config::default()
        };
        StoryWorkflow::new(
            &config,
            Box::new(llm),
            Some(Box::new(tts)),
            Arc::new(FsStorage::new(root)),
        )
    }

    struct FullDiskStorage;

    #[async_trait]
    impl Storage for FullDiskStorage {
        async fn write(&self, _key: &str, _content: &[u8]) -> Result<()> {
            anyhow::bail!("disk full")
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            anyhow::bail!("read-only file system")
        }

        fn locate(&self, key: &str) -> std::path::PathBuf {
            std::path::PathBuf::from(key)
        }
    }

    #[tokio::test]
    async fn test_story_documents_are_written() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let llm = MockLlmClient::new(reply(8, 24));
        let call_count = llm.call_count.clone();
        let last_prompt = llm.last_prompt.clone();
        let mut wf = workflow(temp_dir.path(), llm, MockTtsClient::new(false));

        let story = wf.generate_story_with(weigh_station(), 8).await?;
        assert_eq!(story.narration_script.len(), 11);
        assert_eq!(story.scenes.len(), 30);
        assert_eq!(*call_count.lock().unwrap(), 1);
        assert!(last_prompt
            .lock()
            .unwrap()
            .as_deref()
            .unwrap()
            .contains("a remote desert weigh-station"));

        let dir = temp_dir.path().join("the-scale-never-lies-07");
        assert!(dir.join(STORY_JSON).exists());
        assert!(dir.join(STORY_TEXT).exists());
        assert!(dir.join("03_Veo_Prompts.txt").exists());
        assert!(dir.join("10_Viral_Hashtags.txt").exists());

        let saved: StoryData =
            serde_json::from_str(&std::fs::read_to_string(dir.join(STORY_JSON))?)?;
        assert_eq!(saved.title, "The Scale Never Lies");
        assert_eq!(saved.veo_prompts.len(), 30);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_reply_fails_generation() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut wf = workflow(
            temp_dir.path(),
            MockLlmClient::new(reply(7, 24)),
            MockTtsClient::new(false),
        );

        let err = wf.generate_story_with(weigh_station(), 6).await.unwrap_err();
        assert!(format!("{:#}", err).starts_with("Generation failed: malformed upstream response"));
        assert!(matches!(
            err.downcast_ref::<StoryError>(),
            Some(StoryError::MalformedResponse(_))
        ));
        assert!(wf.story().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_voiceover_writes_wav() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let tts = MockTtsClient::new(false);
        let last_text = tts.last_text.clone();
        let mut wf = workflow(temp_dir.path(), MockLlmClient::new(reply(8, 24)), tts);

        wf.generate_story_with(weigh_station(), 6).await?;
        let handle = wf.generate_voiceover().await?;

        let spoken = last_text.lock().unwrap().clone().unwrap();
        assert_eq!(spoken.split("\n\n").count(), 11);
        assert!(spoken.starts_with("Congratulations."));

        let path = temp_dir.path().join(handle.key());
        let wav = std::fs::read(&path)?;
        assert_eq!(wav.len(), 480 + 44);
        assert_eq!(WavHeader::parse(&wav)?.data_size, 480);

        let story = wf.story().unwrap();
        assert_eq!(story.audio_path.as_deref(), Some(path.display().to_string().as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn test_voice_failure_keeps_story() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut wf = workflow(
            temp_dir.path(),
            MockLlmClient::new(reply(8, 24)),
            MockTtsClient::new(true),
        );

        wf.generate_story_with(weigh_station(), 6).await?;
        let err = wf.generate_voiceover().await.unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "Voice generation failed: no audio data received from the API"
        );
        let story = wf.story().unwrap();
        assert!(story.audio_path.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_voiceover_without_story() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut wf = workflow(
            temp_dir.path(),
            MockLlmClient::new(reply(8, 24)),
            MockTtsClient::new(false),
        );

        let err = wf.generate_voiceover().await.unwrap_err();
        assert!(matches!(err.downcast_ref::<StoryError>(), Some(StoryError::NoStory)));
        Ok(())
    }

    #[tokio::test]
    async fn test_new_story_releases_previous_audio() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut wf = workflow(
            temp_dir.path(),
            MockLlmClient::new(reply(8, 24)),
            MockTtsClient::new(false),
        );

        wf.generate_story_with(weigh_station(), 6).await?;
        let handle = wf.generate_voiceover().await?;
        let first = temp_dir.path().join(handle.key());
        assert!(first.exists());

        let motel = StoryRequest::new("a run-down motel on a lonely highway", 3).unwrap();
        let story = wf.generate_story_with(motel, 7).await?;
        assert!(story.audio_path.is_none());
        assert!(!first.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported_as_generation_failure() -> Result<()> {
        let config = Config::default();
        let mut wf = StoryWorkflow::new(
            &config,
            Box::new(MockLlmClient::new(reply(8, 24))),
            Some(Box::new(MockTtsClient::new(false))),
            Arc::new(FullDiskStorage),
        );

        let err = wf.generate_story_with(weigh_station(), 6).await.unwrap_err();
        assert_eq!(format!("{:#}", err), "Generation failed: disk full");
        assert!(wf.story().is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_release_failure_is_reported_as_voice_failure() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let mut wf = workflow(
            temp_dir.path(),
            MockLlmClient::new(reply(8, 24)),
            MockTtsClient::new(false),
        );
        wf.generate_story_with(weigh_station(), 6).await?;
        wf.generate_voiceover().await?;

        // Swap in a store that can no longer delete the previous narration.
        wf.storage = Arc::new(FullDiskStorage);
        let err = wf.generate_voiceover().await.unwrap_err();
        assert_eq!(
            format!("{:#}", err),
            "Voice generation failed: read-only file system"
        );
        assert!(wf.story().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_voiceover_with_speech_disabled() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = Config::default();
        let mut wf = StoryWorkflow::new(
            &config,
            Box::new(MockLlmClient::new(reply(8, 24))),
            None,
            Arc::new(FsStorage::new(temp_dir.path())),
        );
        assert!(!wf.speech_enabled());

        wf.generate_story_with(weigh_station(), 6).await?;
        let err = wf.generate_voiceover().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoryError>(),
            Some(StoryError::Config(_))
        ));
        assert!(format!("{:#}", err).starts_with("Voice generation failed: configuration error"));
        assert!(wf.story().is_some());
        Ok(())
    }
}
