//! Input discovery and output naming.

use crate::constants::extensions;
use crate::error::Result;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Container and codec for an audio-only result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioOutput {
    /// File extension of the result.
    pub extension: &'static str,
    /// Codec forced by the container, or `None` to use the configured codec.
    pub codec: Option<&'static str>,
    /// Whether a bitrate applies to this codec.
    pub uses_bitrate: bool,
}

/// Pick the audio-only output container from the input's extension.
///
/// FLAC and WAV inputs keep their lossless format, M4A keeps the configured
/// codec, anything else becomes MP3.
#[must_use]
pub fn audio_output_for(input: &Path) -> AudioOutput {
    let ext = input.extension().unwrap_or_default();
    if ext.eq_ignore_ascii_case("flac") {
        AudioOutput {
            extension: "flac",
            codec: Some("flac"),
            uses_bitrate: false,
        }
    } else if ext.eq_ignore_ascii_case("wav") {
        AudioOutput {
            extension: "wav",
            codec: Some("pcm_s16le"),
            uses_bitrate: false,
        }
    } else if ext.eq_ignore_ascii_case("m4a") {
        AudioOutput {
            extension: "m4a",
            codec: None,
            uses_bitrate: true,
        }
    } else {
        AudioOutput {
            extension: "mp3",
            codec: Some("libmp3lame"),
            uses_bitrate: true,
        }
    }
}

/// Destination path for `input`.
///
/// Video inputs become `<stem>.<format>`; audio inputs become
/// `<stem>_vocals.<ext>` (see [`audio_output_for`]).
#[must_use]
pub fn output_path_for(input: &Path, output_dir: &Path, is_video: bool, format: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_else(|| OsStr::new("output"));

    let mut name = stem.to_os_string();
    if is_video {
        name.push(".");
        name.push(format);
    } else {
        name.push("_vocals.");
        name.push(audio_output_for(input).extension);
    }
    output_dir.join(name)
}

/// Collect media files from paths (files and directories).
///
/// Directories are searched recursively; results are sorted for a stable
/// processing order. Explicitly named files are kept even with an unknown
/// extension.
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if !is_media_file(path) {
                warn!("Unrecognized extension, processing anyway: {}", path.display());
            }
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            collect_media_files_recursive(path, &mut found)?;
            found.sort();
            files.extend(found);
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    Ok(files)
}

fn collect_media_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_media_files_recursive(&path, files)?;
        } else if is_media_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a file has a video container extension.
#[must_use]
pub fn is_video_file(path: &Path) -> bool {
    has_extension(path, extensions::VIDEO)
}

/// Check if a file has a supported video or audio extension.
#[must_use]
pub fn is_media_file(path: &Path) -> bool {
    has_extension(path, extensions::VIDEO) || has_extension(path, extensions::AUDIO)
}

fn has_extension(path: &Path, known: &[&str]) -> bool {
    // Compare as OsStr so non-UTF-8 file names still match.
    path.extension()
        .is_some_and(|ext| known.iter().any(|k| ext.eq_ignore_ascii_case(OsStr::new(k))))
}
