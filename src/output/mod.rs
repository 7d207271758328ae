use console::style;
use std::path::Path;

use crate::transcribe::RunSummary;
use crate::utils;

/// Render the end-of-run summary
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "{} rows processed in {}: {} transcribed, {} failed, {} skipped",
        summary.total,
        utils::format_duration(summary.elapsed),
        summary.transcribed,
        summary.failed,
        summary.skipped
    )
}

/// Print the summary of a finished run
pub fn print_summary(summary: &RunSummary, saved_to: &Path) {
    let headline = if summary.failed == 0 && summary.skipped == 0 {
        style("Done").green().bold()
    } else {
        style("Done with problems").yellow().bold()
    };

    println!("{} {}", headline, format_summary(summary));
    println!("Transcripts saved to: {}", saved_to.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_format_summary() {
        let summary = RunSummary {
            total: 6,
            transcribed: 3,
            skipped: 2,
            failed: 1,
            elapsed: Duration::from_secs(75),
        };
        assert_eq!(
            format_summary(&summary),
            "6 rows processed in 1m 15s: 3 transcribed, 1 failed, 2 skipped"
        );
    }
}
