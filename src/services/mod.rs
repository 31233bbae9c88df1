pub mod export;
pub mod llm;
pub mod prompt;
pub mod script;
pub mod tts;
pub mod workflow;
