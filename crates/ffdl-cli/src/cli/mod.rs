//! CLI for ffdl, the Fireflies meeting video downloader.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ffdl_core::config;
use std::path::PathBuf;

use commands::{run_download, run_status};

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUT_DIR: &str = "fireflies_videos";

/// Top-level CLI for ffdl.
#[derive(Debug, Parser)]
#[command(name = "ffdl")]
#[command(about = "ffdl: resumable downloader for Fireflies meeting videos", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Walk the meeting listing and download every available video.
    Download(DownloadArgs),

    /// Summarize the manifest of an output directory.
    Status {
        /// Output directory holding manifest.jsonl.
        #[arg(long, default_value = DEFAULT_OUT_DIR, value_name = "DIR")]
        out: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Fireflies API key.
    #[arg(long, env = "FIREFLIES_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Output directory for videos and manifest.jsonl.
    #[arg(long, default_value = DEFAULT_OUT_DIR, value_name = "DIR")]
    pub out: PathBuf,

    /// Only meetings at or after this date (YYYY-MM-DD or ISO 8601).
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Only meetings before this date (YYYY-MM-DD or ISO 8601).
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Only meetings in this channel.
    #[arg(long, value_name = "ID")]
    pub channel_id: Option<String>,

    /// Include meetings not organized by the API key owner.
    #[arg(long)]
    pub not_mine: bool,

    /// Neither skip completed records nor continue partial files.
    #[arg(long)]
    pub no_resume: bool,

    /// Download again and replace existing files.
    #[arg(long)]
    pub overwrite: bool,

    /// List what would be downloaded without downloading or writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Minimum seconds between listing page requests (overrides config).
    #[arg(long, value_name = "SECS")]
    pub throttle: Option<f64>,

    /// Records per listing page, at most 50 (overrides config).
    #[arg(long, value_name = "N")]
    pub limit: Option<u32>,

    /// Stop after this many records.
    #[arg(long, value_name = "N")]
    pub max_records: Option<u64>,
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_download(&cfg, args)?;
            }
            CliCommand::Status { out } => run_status(&out)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
