//! Help message display for CLI.

#![allow(clippy::print_stdout)]

use crate::config::Config;
use std::path::Path;

/// Print help message based on configuration state.
pub fn print_smart_help(config: &Config, config_path: Option<&Path>) {
    if config_path.is_some_and(Path::exists) {
        print_configured_help(config);
    } else {
        print_first_time_help();
    }
}

/// Print setup guide for first-time users.
pub fn print_first_time_help() {
    println!("No configuration found. Get started with nomusic:");
    println!();
    println!("1. Install the external tools:");
    println!("   • ffmpeg and ffprobe on your PATH");
    println!("   • pip install spleeter demucs");
    println!();
    println!("2. Optionally create a configuration file:");
    println!("   nomusic config init");
    println!();
    println!("3. Process a file or a folder:");
    println!("   nomusic movie.mkv");
    println!("   nomusic ~/Videos/series/ --output-dir clean/");
    println!();
    println!("Run 'nomusic --help' for all options.");
}

/// Print usage summary for configured users.
pub fn print_configured_help(config: &Config) {
    let enabled: Vec<&str> = [
        ("spleeter", config.models.spleeter.enabled),
        ("demucs", config.models.demucs.enabled),
    ]
    .into_iter()
    .filter_map(|(name, on)| on.then_some(name))
    .collect();

    println!("Usage: nomusic [OPTIONS] <INPUTS>...");
    println!();
    println!(
        "Models: {}",
        if enabled.is_empty() {
            "none enabled".to_string()
        } else {
            enabled.join(", ")
        }
    );
    println!("Output: {}", config.output.dir.display());
    println!();
    println!("Examples:");
    println!("  nomusic movie.mkv");
    println!("  nomusic clip.mp4 --duration 60 --keep-temp");
    println!("  nomusic tracks movie.mkv");
    println!();
    println!("Run 'nomusic --help' for all options.");
}
