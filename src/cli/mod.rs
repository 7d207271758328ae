use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "transcript-fetcher",
    about = "Transcript Fetcher - Fill a spreadsheet of YouTube links with their transcripts",
    version,
    long_about = "Reads the 'YouTube URL' column of a worksheet, fetches the English (or Hindi) caption track for every video and writes the text, or the reason it is missing, into a 'Transcript' column of the same file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Fetch transcripts for every row and save them back into the spreadsheet (default)
    Fetch {
        /// Spreadsheet to read and update (defaults to the configured workbook)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Worksheet holding the links (defaults to the configured worksheet)
        #[arg(short, long, value_name = "NAME")]
        sheet: Option<String>,
    },

    /// Write a spreadsheet of dummy links for manual testing
    Sample {
        /// Where to write the spreadsheet (defaults to the configured workbook)
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Worksheet name (defaults to the configured worksheet)
        #[arg(short, long, value_name = "NAME")]
        sheet: Option<String>,

        /// Number of data rows to generate
        #[arg(short, long, default_value = "10")]
        rows: usize,
    },

    /// Create or display the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

impl Cli {
    /// The command to run; a bare invocation fetches with the configured defaults
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Fetch {
            file: None,
            sheet: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_invocation_defaults_to_fetch() {
        let cli = Cli::parse_from(["transcript-fetcher"]);
        assert_eq!(
            cli.command_or_default(),
            Commands::Fetch {
                file: None,
                sheet: None
            }
        );
    }

    #[test]
    fn test_fetch_overrides() {
        let cli = Cli::parse_from([
            "transcript-fetcher",
            "fetch",
            "--file",
            "links.xlsx",
            "--sheet",
            "Videos",
            "-q",
        ]);
        assert!(cli.quiet);
        assert_eq!(
            cli.command_or_default(),
            Commands::Fetch {
                file: Some(PathBuf::from("links.xlsx")),
                sheet: Some("Videos".to_string())
            }
        );
    }

    #[test]
    fn test_sample_row_count() {
        let cli = Cli::parse_from(["transcript-fetcher", "sample", "--rows", "3"]);
        assert_eq!(
            cli.command_or_default(),
            Commands::Sample {
                file: None,
                sheet: None,
                rows: 3
            }
        );
    }
}
