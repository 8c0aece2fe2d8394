mod cli;
mod menu;

use anyhow::Result;
use clap::Parser;
use notekeeper_core::{NotePipeline, PipelineEvent};
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so they never interleave with menu prompts
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.to_config()?;
    tracing::debug!(?config, "configuration resolved");
    let pipeline = NotePipeline::with_events(config, report_event);

    pipeline.start()?;
    println!("System started. Background tasks running.");
    println!("Notes: {}", pipeline.config().notes_path.display());

    let outcome = menu::run(&pipeline);

    println!("Stopping background tasks...");
    pipeline.stop();
    println!("Bye.");

    outcome
}

fn report_event(event: PipelineEvent) {
    match event {
        PipelineEvent::NoteAnalyzed { words, .. } => {
            eprintln!("\n[BACKGROUND INFO]: Note analyzed and saved to the log. (Words: {words})");
        }
        PipelineEvent::AnalysisFailed { message } => {
            eprintln!("\n[BACKGROUND ERROR]: Analysis could not be logged: {message}");
        }
        PipelineEvent::BackupFailed { message } => {
            eprintln!("\n[BACKUP ERROR]: {message}");
        }
        PipelineEvent::BackupWritten { .. } | PipelineEvent::BackupSkipped => {}
    }
}
