use std::fmt;

use crate::provider::{join_segments, FetchError, TranscriptSegment};

/// Result of fetching one row's transcript, as stored in the Transcript column
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Flattened transcript text
    Transcript(String),
    NoTranscript,
    TranscriptsDisabled,
    VideoUnavailable,
    /// Any other failure, with its message
    Failed(String),
}

impl Outcome {
    /// Classify the provider's answer
    pub fn from_fetch(result: Result<Vec<TranscriptSegment>, FetchError>) -> Self {
        match result {
            Ok(segments) => Outcome::Transcript(join_segments(&segments)),
            Err(FetchError::NoTranscriptFound { .. }) => Outcome::NoTranscript,
            Err(FetchError::TranscriptsDisabled(_)) => Outcome::TranscriptsDisabled,
            Err(FetchError::VideoUnavailable(_)) => Outcome::VideoUnavailable,
            Err(other) => Outcome::Failed(other.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Transcript(_))
    }

    /// Short label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Transcript(_) => "transcript fetched",
            Outcome::NoTranscript => "no transcript",
            Outcome::TranscriptsDisabled => "transcripts disabled",
            Outcome::VideoUnavailable => "video unavailable",
            Outcome::Failed(_) => "error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Transcript(text) => f.write_str(text),
            Outcome::NoTranscript => f.write_str("No transcript found."),
            Outcome::TranscriptsDisabled => f.write_str("Transcripts disabled by uploader."),
            Outcome::VideoUnavailable => f.write_str("Video unavailable."),
            Outcome::Failed(message) => write!(f, "Error: {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::VideoId;

    fn id() -> VideoId {
        VideoId::from("abc")
    }

    #[test]
    fn test_cell_strings() {
        let no_transcript = Outcome::from_fetch(Err(FetchError::NoTranscriptFound {
            video_id: id(),
            requested: vec!["en".to_string(), "hi".to_string()],
        }));
        assert_eq!(no_transcript.to_string(), "No transcript found.");

        let disabled = Outcome::from_fetch(Err(FetchError::TranscriptsDisabled(id())));
        assert_eq!(disabled.to_string(), "Transcripts disabled by uploader.");

        let unavailable = Outcome::from_fetch(Err(FetchError::VideoUnavailable(id())));
        assert_eq!(unavailable.to_string(), "Video unavailable.");
    }

    #[test]
    fn test_other_errors_keep_message() {
        let outcome = Outcome::from_fetch(Err(FetchError::RequestBlocked));
        assert_eq!(
            outcome.to_string(),
            "Error: YouTube is blocking requests from this IP address"
        );
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_success_joins_text() {
        let outcome = Outcome::from_fetch(Ok(vec![
            TranscriptSegment::new("Never", 0.0, 1.0),
            TranscriptSegment::new("gonna", 1.0, 1.0),
        ]));
        assert_eq!(outcome, Outcome::Transcript("Never gonna".to_string()));
        assert!(outcome.is_success());
    }
}
