use thiserror::Error;

/// Failures the workflow reports to the user by category.
#[derive(Debug, Error)]
pub enum StoryError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("upstream service error: {0}")]
    Upstream(String),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("no audio data received from the API")]
    MissingAudio,

    #[error("no story has been generated yet")]
    NoStory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_human_readable() {
        let err = StoryError::MalformedResponse("expected 8 rules, got 7".to_string());
        assert_eq!(
            err.to_string(),
            "malformed upstream response: expected 8 rules, got 7"
        );
        assert_eq!(
            StoryError::MissingAudio.to_string(),
            "no audio data received from the API"
        );
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let err: anyhow::Error = StoryError::Config("API key missing".to_string()).into();
        let err = err.context("Generation failed");
        assert!(matches!(
            err.downcast_ref::<StoryError>(),
            Some(StoryError::Config(_))
        ));
    }
}
