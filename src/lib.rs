//! Transcript Fetcher - A Rust CLI tool that fills a spreadsheet of YouTube links with transcripts
//!
//! This library reads a worksheet of video URLs, extracts the video identifier from each row,
//! fetches the caption track for it from YouTube and writes the transcript (or the reason it
//! could not be fetched) back into the same row.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod provider;
pub mod transcribe;
pub mod utils;
pub mod workbook;

pub use cli::{Cli, Commands};
pub use config::Config;
pub use extractors::{extract_video_id, VideoId};
pub use provider::{FetchError, TranscriptProvider, TranscriptSegment, YoutubeTranscriptApi};
pub use transcribe::{Outcome, RowProcessor, RunSummary};
pub use workbook::{Cell, Sheet};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Column holding the video links
pub const URL_COLUMN: &str = "YouTube URL";

/// Column the transcript (or failure reason) is written to
pub const TRANSCRIPT_COLUMN: &str = "Transcript";

/// Caption languages requested for every video, most preferred first
pub const LANGUAGES: &[&str] = &["en", "hi"];

/// Error types specific to the fetcher
#[derive(thiserror::Error, Debug)]
pub enum FetcherError {
    #[error("Spreadsheet not found: {0}")]
    WorkbookNotFound(String),

    #[error("Worksheet '{sheet}' not found (available: {available})")]
    SheetNotFound { sheet: String, available: String },

    #[error("Worksheet '{0}' is empty")]
    EmptySheet(String),

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),
}
