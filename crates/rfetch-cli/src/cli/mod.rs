//! CLI for the rfetch resumable fetcher.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rfetch_core::config;
use std::path::PathBuf;

use commands::{run_config, run_get, GetArgs};

/// Top-level CLI for rfetch.
#[derive(Debug, Parser)]
#[command(name = "rfetch")]
#[command(about = "rfetch: resumable fetcher with adaptive retries", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch one or more sources (HTTP/HTTPS/FTP URLs or local paths).
    Get {
        /// Sources to fetch.
        #[arg(required = true, value_name = "SOURCE")]
        sources: Vec<String>,

        /// Directory to write into (default: current directory).
        #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Fetch up to N sources at once (default: max_parallel_fetches from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,

        /// Ignore existing .part files and start from zero.
        #[arg(long)]
        restart: bool,

        /// Known object size in bytes; skips the size probe. Single source only.
        #[arg(long, value_name = "BYTES")]
        size: Option<u64>,

        /// Initial chunk size in bytes (overrides config).
        #[arg(long, value_name = "BYTES")]
        chunk_size: Option<usize>,
    },

    /// Print the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Get {
                sources,
                output_dir,
                jobs,
                restart,
                size,
                chunk_size,
            } => {
                let output_dir = match output_dir {
                    Some(dir) => dir,
                    None => std::env::current_dir()?,
                };
                let args = GetArgs {
                    sources,
                    output_dir,
                    jobs: jobs.unwrap_or(cfg.max_parallel_fetches),
                    restart,
                    size,
                    chunk_size,
                };
                run_get(&cfg, args).await?;
            }
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
