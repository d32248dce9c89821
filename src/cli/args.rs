//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Remove background music from video and audio files.
#[derive(Debug, Parser)]
#[command(name = "nomusic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Input files or directories to process.
    pub inputs: Vec<PathBuf>,

    /// Configuration file (default: platform config directory).
    #[arg(long, global = true, env = "NOMUSIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Options for processing.
    #[command(flatten)]
    pub process: ProcessArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// List the audio streams of a media file.
    Tracks {
        /// File to inspect.
        file: PathBuf,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for processing files.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct ProcessArgs {
    /// Output directory (default: ./nomusic).
    #[arg(short, long, env = "NOMUSIC_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Maximum concurrent model invocations.
    #[arg(short, long, value_parser = parse_workers, env = "NOMUSIC_WORKERS")]
    pub workers: Option<usize>,

    /// Only process the first N seconds of each input.
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<f64>,

    /// Keep temporary files and print their location.
    #[arg(long)]
    pub keep_temp: bool,

    /// Persistent working directory; interrupted runs resume from it.
    #[arg(long, env = "NOMUSIC_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Run both models at the same time.
    #[arg(long)]
    pub concurrent_models: bool,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,

    /// Only print warnings and errors.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse and validate a worker count.
fn parse_workers(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if value == 0 {
        return Err("workers must be at least 1".to_string());
    }

    Ok(value)
}

/// Parse and validate a duration in seconds.
fn parse_duration(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(format!("duration must be a positive number of seconds, got {value}"));
    }

    Ok(value)
}
