//! vpress - smart video compression CLI.
//!
//! Analyzes video content, chooses encoder parameters tuned to it, and drives
//! an external FFmpeg process to re-encode the input, reporting a detailed
//! before/after summary.

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod args;
mod cache_cmd;
mod paths;
mod run;

use args::{Cli, Command};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_directive = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_target(false)
        .init();

    let outcome = match &cli.command {
        Some(Command::Version) => {
            println!("vpress {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(Command::Cache { clear_all, max_age }) => {
            cache_cmd::manage_cache(*clear_all, *max_age)
        }
        None => run::run(&cli).await,
    };

    if let Err(e) = outcome {
        error!("{e:#}");
        std::process::exit(1);
    }
}
