//! nomusic - background music removal CLI tool.
//!
//! Runs two source-separation models over a recording and fuses their vocal
//! stems into one clean track, remuxed with the original video.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod media;
pub mod output;
pub mod pipeline;
pub mod separation;
pub mod utils;

#[cfg(test)]
mod test_support;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, ProcessArgs};
use config::{Config, load_config_or_default, resolve_config_path, save_config};
use media::{AudioStream, Ffmpeg, MediaTool, select_audio_stream};
use output::{IndicatifProgress, LogProgress, ProgressSink};
use pipeline::{Orchestrator, collect_input_files};
use separation::{CancellationToken, DemucsSeparator, Separator, SpleeterSeparator};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for nomusic CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.process.verbose, cli.process.quiet);

    let config = load_config_or_default(cli.config.as_deref());

    if let Some(command) = cli.command {
        return handle_command(command, &config, cli.config.as_deref());
    }

    if cli.inputs.is_empty() {
        let path = resolve_config_path(cli.config.as_deref()).ok();
        cli::help::print_smart_help(&config, path.as_deref());
        return Ok(());
    }

    // First Ctrl+C stops dispatching new segments, a second one exits.
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            std::process::exit(130); // 128 + SIGINT(2)
        }
        warn!("Interrupted; waiting for running model invocations (Ctrl+C again to abort)");
        handler_token.cancel();
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    let config = apply_overrides(config, &cli.process);
    process_files(&cli.inputs, &cli.process, &config, &cancel)
}

/// Apply command-line overrides on top of the loaded configuration.
fn apply_overrides(mut config: Config, args: &ProcessArgs) -> Config {
    if let Some(dir) = &args.output_dir {
        config.output.dir.clone_from(dir);
    }
    if let Some(workers) = args.workers {
        config.processing.workers = workers;
    }
    if let Some(work_dir) = &args.work_dir {
        config.processing.work_dir = Some(work_dir.clone());
    }
    config.processing.keep_temp |= args.keep_temp;
    config.processing.concurrent_models |= args.concurrent_models;
    config
}

/// Build the enabled separators, primary model first.
fn build_separators(config: &Config) -> Vec<Box<dyn Separator>> {
    let mut separators: Vec<Box<dyn Separator>> = Vec::new();
    if config.models.spleeter.enabled {
        separators.push(Box::new(SpleeterSeparator::new(&config.models.spleeter)));
    } else {
        info!("Spleeter disabled in configuration");
    }
    if config.models.demucs.enabled {
        separators.push(Box::new(DemucsSeparator::new(&config.models.demucs)));
    } else {
        info!("Demucs disabled in configuration");
    }
    separators
}

/// Process every media file found under `inputs`.
fn process_files(
    inputs: &[PathBuf],
    args: &ProcessArgs,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<()> {
    use std::time::Instant;

    let total_start = Instant::now();

    let files = collect_input_files(inputs)?;
    if files.is_empty() {
        return Err(Error::NoValidInputFiles);
    }
    info!("Found {} media file(s) to process", files.len());

    let separators = build_separators(config);
    if separators.is_empty() {
        error!("Both separation models are disabled");
        return Err(Error::NoSeparationOutput);
    }
    let media = Ffmpeg::new(&config.tools.ffmpeg, &config.tools.ffprobe)?;

    let progress_enabled = !args.quiet && !args.no_progress;
    let mut processed = 0;
    let mut failed = 0;

    for file in &files {
        if cancel.is_cancelled() {
            break;
        }

        let sink: Box<dyn ProgressSink> = if progress_enabled {
            let name = file
                .file_name()
                .map_or_else(|| file.to_string_lossy(), |n| n.to_string_lossy());
            Box::new(IndicatifProgress::new(&name))
        } else {
            Box::new(LogProgress::default())
        };

        let outcome = Orchestrator::new(config, &media, &separators, sink.as_ref(), cancel.clone())
            .run(file, args.duration);

        if outcome.is_done() {
            processed += 1;
        } else {
            failed += 1;
            if args.fail_fast {
                return Err(Error::FilesFailed {
                    failed,
                    total: processed + failed,
                });
            }
        }
    }

    info!(
        "Complete: {} processed, {} failed in {:.1}s",
        processed,
        failed,
        total_start.elapsed().as_secs_f64()
    );

    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    if failed > 0 {
        return Err(Error::FilesFailed {
            failed,
            total: processed + failed,
        });
    }
    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_command(command: Command, config: &Config, config_path: Option<&Path>) -> Result<()> {
    match command {
        Command::Config { action } => handle_config_command(action, config, config_path),
        Command::Tracks { file } => handle_tracks_command(&file, config),
    }
}

#[allow(clippy::print_stdout)]
fn handle_config_command(
    action: ConfigAction,
    config: &Config,
    config_path: Option<&Path>,
) -> Result<()> {
    let path = resolve_config_path(config_path)?;

    match action {
        ConfigAction::Init => {
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                save_config(&Config::default(), &path)?;
                println!("Created configuration file: {}", path.display());
            }
        }
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(config)
                .map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("# {}", path.display());
            print!("{rendered}");
        }
        ConfigAction::Path => println!("{}", path.display()),
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn handle_tracks_command(file: &Path, config: &Config) -> Result<()> {
    let media = Ffmpeg::new(&config.tools.ffmpeg, &config.tools.ffprobe)?;
    let info = media.probe(file)?;
    if info.audio_streams.is_empty() {
        return Err(Error::NoAudioTracks {
            path: file.to_path_buf(),
        });
    }

    let selected = select_audio_stream(&info.audio_streams, &config.audio.language_priority)
        .map(|s| s.index);
    println!("Audio streams in {}:", file.display());
    for stream in &info.audio_streams {
        println!("  {}", describe_stream(stream, selected == Some(stream.index)));
    }
    Ok(())
}

/// One-line summary of an audio stream for the `tracks` command.
fn describe_stream(stream: &AudioStream, selected: bool) -> String {
    let unknown = || "?".to_string();
    format!(
        "#{:<3} {:<5} {:<10} {:>2} ch {:>6} Hz{}",
        stream.index,
        stream.language.as_deref().unwrap_or("und"),
        stream.codec.as_deref().unwrap_or("?"),
        stream.channels.map_or_else(unknown, |c| c.to_string()),
        stream.sample_rate.map_or_else(unknown, |r| r.to_string()),
        if selected { "  [selected]" } else { "" }
    )
}
