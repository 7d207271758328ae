use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::time::{Duration, Instant};

use crate::extractors::{video_id_from_url, VideoId};
use crate::provider::TranscriptProvider;
use crate::utils;
use crate::workbook::{Cell, Sheet};
use crate::{FetcherError, LANGUAGES, TRANSCRIPT_COLUMN, URL_COLUMN};

pub mod outcome;

pub use outcome::Outcome;

/// Why a row was left without a transcript
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    MissingUrl,
    NotText,
    UnrecognisedUrl(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingUrl => f.write_str("no URL"),
            SkipReason::NotText => f.write_str("URL cell is not text"),
            SkipReason::UnrecognisedUrl(url) => {
                write!(f, "could not extract a video ID from '{}'", url)
            }
        }
    }
}

/// What happened to one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowStatus {
    Skipped(SkipReason),
    Fetched { video_id: VideoId, outcome: Outcome },
}

impl RowStatus {
    /// Console line reported for the row
    pub fn diagnostic(&self, row_number: usize) -> String {
        match self {
            RowStatus::Skipped(reason) => format!("Row {}: skipped, {}", row_number, reason),
            RowStatus::Fetched {
                video_id,
                outcome: Outcome::Transcript(text),
            } => format!(
                "Row {}: transcript fetched for {} ({} chars): {}",
                row_number,
                video_id,
                text.chars().count(),
                utils::preview(text, 60)
            ),
            RowStatus::Fetched {
                video_id,
                outcome: Outcome::Failed(message),
            } => format!("Row {}: {} failed: {}", row_number, video_id, message),
            RowStatus::Fetched { video_id, outcome } => {
                format!("Row {}: {} for {}", row_number, outcome.label(), video_id)
            }
        }
    }
}

/// Counts for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub total: usize,
    pub transcribed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, status: &RowStatus) {
        self.total += 1;
        match status {
            RowStatus::Skipped(_) => self.skipped += 1,
            RowStatus::Fetched { outcome, .. } if outcome.is_success() => self.transcribed += 1,
            RowStatus::Fetched { .. } => self.failed += 1,
        }
    }
}

/// Fills the Transcript column of a sheet, one row at a time
pub struct RowProcessor<P> {
    provider: P,
    languages: Vec<String>,
    show_progress: bool,
}

impl<P: TranscriptProvider> RowProcessor<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            languages: LANGUAGES.iter().map(|language| language.to_string()).collect(),
            show_progress: false,
        }
    }

    /// Draw a progress bar while rows are processed
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Fetch a transcript for every row in source order and store the outcome in the
    /// Transcript column, which is cleared first.
    ///
    /// Fails only when the sheet has no URL column, before any row is touched. Skipped and
    /// failed rows never stop the run.
    pub async fn process(&self, sheet: &mut Sheet) -> Result<RunSummary, FetcherError> {
        let url_column = sheet.require_column(URL_COLUMN)?;
        let transcript_column = sheet.ensure_column(TRANSCRIPT_COLUMN);
        for row in 0..sheet.len() {
            sheet.set_cell(row, transcript_column, Cell::Empty);
        }

        let started = Instant::now();
        let progress = self.progress_bar(sheet.len() as u64);
        let mut summary = RunSummary::default();

        for row in 0..sheet.len() {
            let row_number = row + 1;
            let url = sheet.cell(row, url_column).clone();
            progress.set_message(format!("row {}", row_number));

            let status = self.process_row(&progress, row_number, &url).await;
            if let RowStatus::Fetched { outcome, .. } = &status {
                sheet.set_cell(row, transcript_column, Cell::Text(outcome.to_string()));
            }

            summary.record(&status);
            progress.inc(1);
        }

        progress.finish_and_clear();
        summary.elapsed = started.elapsed();
        Ok(summary)
    }

    /// Handle a single row; every failure is folded into the returned status
    pub async fn process_row(
        &self,
        progress: &ProgressBar,
        row_number: usize,
        url: &Cell,
    ) -> RowStatus {
        let status = self.classify_row(url).await;

        let diagnostic = status.diagnostic(row_number);
        progress.suspend(|| match &status {
            RowStatus::Fetched { outcome, .. } if outcome.is_success() => {
                tracing::info!("{}", diagnostic);
            }
            RowStatus::Fetched {
                outcome: Outcome::Failed(_),
                ..
            } => tracing::error!("{}", diagnostic),
            _ => tracing::warn!("{}", diagnostic),
        });

        status
    }

    async fn classify_row(&self, url: &Cell) -> RowStatus {
        if url.is_empty() {
            return RowStatus::Skipped(SkipReason::MissingUrl);
        }
        let Some(text) = url.as_text().map(str::trim) else {
            return RowStatus::Skipped(SkipReason::NotText);
        };
        if text.is_empty() {
            return RowStatus::Skipped(SkipReason::MissingUrl);
        }

        let Some(video_id) = video_id_from_url(text) else {
            return RowStatus::Skipped(SkipReason::UnrecognisedUrl(text.to_string()));
        };

        tracing::debug!("Requesting transcript for {} ({:?})", video_id, self.languages);
        let result = self
            .provider
            .fetch_transcript(&video_id, &self.languages)
            .await;

        RowStatus::Fetched {
            video_id,
            outcome: Outcome::from_fetch(result),
        }
    }

    fn progress_bar(&self, rows: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let progress = ProgressBar::new(rows);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            Ok(style) => progress.set_style(style.progress_chars("=> ")),
            Err(e) => tracing::debug!("Falling back to the default progress style: {}", e),
        }
        progress
    }
}
