//! CLI for the vodgrab broadcast archiver.

mod commands;
mod progress;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use vodgrab_core::config;

use commands::{run_completions, run_download, run_inspect, run_manpage, run_status};

/// Top-level CLI for vodgrab.
#[derive(Debug, Parser)]
#[command(name = "vodgrab")]
#[command(about = "vodgrab: download archived video broadcasts segment by segment", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every selected broadcast listed in a descriptor file.
    Download {
        /// JSON file holding an array of broadcast descriptors.
        descriptors: PathBuf,
        /// Directory under which each broadcast gets its own folder (default: current directory).
        #[arg(long, short = 'o', value_name = "DIR")]
        output: Option<PathBuf>,
        /// Maximum concurrent part transfers across all broadcasts (overrides config).
        #[arg(long, value_name = "N")]
        workers: Option<usize>,
    },

    /// Fetch a playlist and print its renditions or segments.
    Inspect {
        /// Playlist URL.
        url: String,
        /// Follow this rendition group of a master playlist and print its segments.
        #[arg(long, value_name = "GROUP")]
        rendition: Option<String>,
    },

    /// Show part counts recorded in a broadcast's storage directory.
    Status {
        /// Storage directory of one broadcast.
        dir: PathBuf,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Print the man page (roff).
    Manpage,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Download {
                descriptors,
                output,
                workers,
            } => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                let output = match output {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                run_download(&cfg, &descriptors, &output, workers).await?;
            }
            CliCommand::Inspect { url, rendition } => {
                let cfg = config::load_or_init()?;
                run_inspect(&cfg, &url, rendition.as_deref()).await?;
            }
            CliCommand::Status { dir } => run_status(&dir)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Manpage => run_manpage()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
