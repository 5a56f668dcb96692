//! CLI for ftail: follow growing HTTP resources like `tail -f`.

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use ftail_core::config::{self, FtailConfig};
use std::path::PathBuf;

use commands::{run_config, run_follow, run_probe, FollowArgs};

/// Top-level CLI for ftail.
#[derive(Debug, Parser)]
#[command(name = "ftail")]
#[command(about = "ftail: follow growing files over HTTP", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of `~/.config/ftail/config.toml`.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Follow one or more URLs, writing appended bytes to stdout.
    Follow {
        /// HTTP/HTTPS URLs to follow. When omitted, the `[target]` entries of the config are used.
        urls: Vec<String>,

        /// Start at this byte offset instead of the beginning.
        #[arg(long, value_name = "BYTES")]
        offset: Option<u64>,

        /// Seconds between polls (also the backoff base).
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,

        /// Failed attempts in a row before a URL is given up.
        #[arg(long, value_name = "N")]
        max_retries: Option<u32>,

        /// Also report unchanged polls and failed attempts, one line each on stderr.
        #[arg(long)]
        always_callback: bool,

        /// Log every target's position after each poll.
        #[arg(short, long)]
        verbose: bool,

        /// Poll all URLs from one thread in turn instead of one thread per URL.
        #[arg(long)]
        round_robin: bool,
    },

    /// Probe a URL once and print what the server reports about it.
    Probe {
        /// HTTP/HTTPS URL to probe.
        url: String,
    },

    /// Print the config file path and the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = load_config(cli.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Follow {
                urls,
                offset,
                wait,
                max_retries,
                always_callback,
                verbose,
                round_robin,
            } => {
                let args = FollowArgs {
                    urls,
                    offset,
                    wait,
                    max_retries,
                    always_callback,
                    verbose,
                    round_robin,
                };
                run_follow(&cfg, args).await?;
            }
            CliCommand::Probe { url } => run_probe(&cfg, &url).await?,
            CliCommand::Config => run_config(&cfg, cli.config.as_deref())?,
        }

        Ok(())
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<FtailConfig> {
    match path {
        Some(p) => config::load_from_path(p),
        None => config::load_or_init(),
    }
}

#[cfg(test)]
mod tests;
