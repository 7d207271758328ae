use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use transcript_fetcher::cli::{Cli, Commands};
use transcript_fetcher::config::Config;
use transcript_fetcher::provider::YoutubeTranscriptApi;
use transcript_fetcher::transcribe::RowProcessor;
use transcript_fetcher::{output, workbook};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "transcript_fetcher=debug"
    } else {
        "transcript_fetcher=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(console::user_attended_stderr()),
        )
        .init();

    let config = Config::load()?;

    match cli.command_or_default() {
        Commands::Fetch { file, sheet } => {
            let path = file.unwrap_or_else(|| config.workbook.path.clone());
            let sheet_name = sheet.unwrap_or_else(|| config.workbook.sheet.clone());
            fetch(&config, path, &sheet_name, !cli.quiet).await?;
        }
        Commands::Sample { file, sheet, rows } => {
            let path = file.unwrap_or_else(|| config.workbook.path.clone());
            let sheet_name = sheet.unwrap_or_else(|| config.workbook.sheet.clone());
            workbook::sample::write_sample(&path, &sheet_name, rows)?;
            println!("Sample spreadsheet written to: {}", path.display());
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                config.init()?;
            }
        }
    }

    Ok(())
}

/// Load the sheet, fill in every row's transcript and write the sheet back
async fn fetch(
    config: &Config,
    path: PathBuf,
    sheet_name: &str,
    show_progress: bool,
) -> Result<()> {
    tracing::info!("Transcript fetcher started.");

    let mut sheet = workbook::load_sheet(&path, sheet_name).map_err(|e| {
        tracing::error!("Could not load {}: {:#}", path.display(), e);
        e
    })?;
    tracing::info!(
        "Loaded {} rows from worksheet '{}' of {}",
        sheet.len(),
        sheet_name,
        path.display()
    );

    let provider =
        YoutubeTranscriptApi::new(config.http_timeout(), config.http.accept_language.clone())
            .context("Failed to create HTTP client")?;
    let processor = RowProcessor::new(provider).with_progress(show_progress);

    let summary = processor.process(&mut sheet).await.map_err(|e| {
        tracing::error!("Could not process {}: {}", path.display(), e);
        e
    })?;
    tracing::info!("Finished processing {} rows", summary.total);

    workbook::save_sheet(&path, &sheet)
        .map_err(|e| {
            tracing::error!("Could not save {}: {:#}", path.display(), e);
            e
        })
        .context("Failed to save results")?;

    output::print_summary(&summary, &path);
    Ok(())
}
