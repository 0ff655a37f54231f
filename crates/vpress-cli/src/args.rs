//! Command-line arguments.

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use vpress_models::SpeedPreset;

/// Smart video compression tool.
///
/// Reduces video file sizes while maintaining the highest possible visual
/// quality, picking encoder settings from an analysis of the content.
#[derive(Debug, Parser)]
#[command(
    name = "vpress",
    version,
    about = "Smart video compression tool",
    after_help = "Examples:\n  vpress -i input.mp4\n  vpress -i input.mp4 -o output.mp4 -q 4 -p thorough -f -v\n  vpress -i videos/ -r -c"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input video file or directory
    #[arg(short = 'i', long)]
    pub input: Option<PathBuf>,

    /// Output file (default: <input>_compressed.<ext>)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Quality level (1=max compression, 5=max quality)
    #[arg(short = 'q', long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub quality: u8,

    /// Compression preset
    #[arg(short = 'p', long, default_value = "balanced", value_parser = parse_preset)]
    pub preset: SpeedPreset,

    /// Force overwrite of existing output files
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Show verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Recurse into subdirectories when the input is a directory
    #[arg(short = 'r', long)]
    pub recursive: bool,

    /// Use the analysis cache
    #[arg(short = 'c', long = "use-cache")]
    pub use_cache: bool,

    /// Clean expired cache entries before processing
    #[arg(short = 'C', long = "clear-cache")]
    pub clear_cache: bool,

    /// Maximum age of cache entries in days
    #[arg(short = 'A', long = "cache-max-age", default_value_t = 7)]
    pub cache_max_age: i64,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display version information
    Version,
    /// Manage the analysis cache
    Cache {
        /// Clear all cache entries
        #[arg(long)]
        clear_all: bool,
        /// Clear entries older than this many days
        #[arg(long, default_value_t = 30)]
        max_age: i64,
    },
}

fn parse_preset(s: &str) -> Result<SpeedPreset, String> {
    SpeedPreset::from_str(s)
}
