use async_trait::async_trait;

pub mod timedtext;
pub mod youtube;

pub use youtube::YoutubeTranscriptApi;

use crate::extractors::VideoId;

/// One timed unit of caption text
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    /// Caption text with markup removed
    pub text: String,

    /// Start time in seconds
    pub start: f64,

    /// Duration in seconds
    pub duration: f64,
}

impl TranscriptSegment {
    pub fn new(text: impl Into<String>, start: f64, duration: f64) -> Self {
        Self {
            text: text.into(),
            start,
            duration,
        }
    }
}

/// Join segment texts into one flat string, in order, separated by single spaces
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Why a transcript could not be fetched
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("No transcript found for {video_id} in any of the requested languages {requested:?}")]
    NoTranscriptFound {
        video_id: VideoId,
        requested: Vec<String>,
    },

    #[error("Transcripts are disabled for {0}")]
    TranscriptsDisabled(VideoId),

    #[error("Video {0} is no longer available")]
    VideoUnavailable(VideoId),

    #[error("Video {0} is age restricted")]
    AgeRestricted(VideoId),

    #[error("Video {video_id} is unplayable: {reason}")]
    VideoUnplayable { video_id: VideoId, reason: String },

    #[error("YouTube is blocking requests from this IP address")]
    RequestBlocked,

    #[error("Failed to accept the YouTube consent page")]
    ConsentRequired,

    #[error("Unexpected response from YouTube: {0}")]
    InvalidResponse(String),

    #[error("Request to YouTube failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Source of video transcripts
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptProvider: Send + Sync {
    /// Fetch the transcript for a video, trying `languages` in order of preference
    async fn fetch_transcript(
        &self,
        video_id: &VideoId,
        languages: &[String],
    ) -> Result<Vec<TranscriptSegment>, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_segments() {
        let segments = vec![
            TranscriptSegment::new("Never", 0.0, 1.0),
            TranscriptSegment::new("gonna", 1.0, 1.0),
            TranscriptSegment::new("give", 2.0, 1.5),
        ];
        assert_eq!(join_segments(&segments), "Never gonna give");
        assert_eq!(join_segments(&[]), "");
    }
}
