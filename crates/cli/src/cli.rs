use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use notekeeper_core::PipelineConfig;

#[derive(Parser, Debug)]
#[command(name = "notekeeper")]
#[command(about = "Keep notes with background analysis and periodic backups", long_about = None)]
pub struct Cli {
    /// Directory holding the note file, backup and analysis log
    /// (default: per-user data directory)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Note file, overriding the one in --dir
    #[arg(long)]
    pub notes: Option<PathBuf>,

    /// Backup file, overriding the one in --dir
    #[arg(long)]
    pub backup: Option<PathBuf>,

    /// Analysis log, overriding the one in --dir
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Seconds between backups
    #[arg(short, long, default_value = "10")]
    pub interval: u64,

    /// Simulated analysis time per note, in milliseconds
    #[arg(long, default_value = "2000")]
    pub analysis_delay_ms: u64,

    /// Print debug diagnostics (same as RUST_LOG=debug)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn to_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.dir {
            Some(dir) => PipelineConfig::in_dir(dir),
            None => PipelineConfig::with_default_dir(cfg!(debug_assertions))
                .context("could not determine a data directory; pass --dir")?,
        };

        if let Some(notes) = &self.notes {
            config = config.notes_path(notes);
        }
        if let Some(backup) = &self.backup {
            config = config.backup_path(backup);
        }
        if let Some(log) = &self.log {
            config = config.analysis_log_path(log);
        }

        Ok(config
            .backup_interval(Duration::from_secs(self.interval))
            .analysis_delay(Duration::from_millis(self.analysis_delay_ms)))
    }
}
