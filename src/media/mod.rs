//! Media inspection, extraction and encoding.
//!
//! Everything that touches container formats goes through the
//! [`MediaTool`] trait. [`Ffmpeg`] is the production implementation.

mod ffmpeg;

pub use ffmpeg::{Ffmpeg, encode_args, parse_probe_output};

use crate::error::Result;
use std::path::Path;

/// An audio stream inside a media file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioStream {
    /// Absolute stream index within the container.
    pub index: usize,
    /// Language tag, if present.
    pub language: Option<String>,
    /// Codec name.
    pub codec: Option<String>,
    /// Channel count.
    pub channels: Option<u32>,
    /// Sample rate in Hz.
    pub sample_rate: Option<u32>,
}

/// Probe result for a media file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    /// Container duration in seconds, if known.
    pub duration: Option<f64>,
    /// Whether the file carries a real video stream (cover art excluded).
    pub has_video: bool,
    /// Audio streams in container order.
    pub audio_streams: Vec<AudioStream>,
}

/// Parameters for the final encode or remux.
#[derive(Debug, Clone)]
pub struct EncodeJob<'a> {
    /// Fused vocal track.
    pub vocals: &'a Path,
    /// Destination file.
    pub output: &'a Path,
    /// Source whose first video stream is remuxed; `None` for audio output.
    pub video_source: Option<&'a Path>,
    /// Audio codec.
    pub audio_codec: &'a str,
    /// Audio bitrate, if any.
    pub audio_bitrate: Option<&'a str>,
    /// Video codec (ignored for audio output).
    pub video_codec: &'a str,
    /// Video bitrate, if any.
    pub video_bitrate: Option<&'a str>,
    /// Apply loudness normalization.
    pub normalize: bool,
    /// Output sample rate, if it should be forced.
    pub sample_rate: Option<u32>,
}

/// Operations the pipeline needs from an external media toolkit.
///
/// All outputs written by the `extract_audio`, `cut`, `silence`, `concat`
/// and `apply_filter` operations are PCM WAV files.
pub trait MediaTool: Send + Sync {
    /// Inspect a media file.
    fn probe(&self, path: &Path) -> Result<MediaInfo>;

    /// Extract one audio stream as a stereo WAV working copy.
    ///
    /// `stream` is an absolute stream index; `None` takes the first audio
    /// stream. `limit_secs` keeps only the beginning of the input.
    fn extract_audio(
        &self,
        input: &Path,
        stream: Option<usize>,
        limit_secs: Option<f64>,
        output: &Path,
    ) -> Result<()>;

    /// Copy `duration_secs` of audio starting at `start_secs`.
    fn cut(&self, input: &Path, start_secs: f64, duration_secs: f64, output: &Path) -> Result<()>;

    /// Write exactly `round(duration_secs * sample_rate)` frames of silence.
    fn silence(
        &self,
        duration_secs: f64,
        sample_rate: u32,
        channels: u16,
        output: &Path,
    ) -> Result<()>;

    /// Join the files named in a concat list without re-encoding.
    fn concat(&self, list_file: &Path, output: &Path) -> Result<()>;

    /// Run `input` through an audio filter chain.
    fn apply_filter(&self, input: &Path, filter: &str, output: &Path) -> Result<()>;

    /// Produce the final artifact.
    fn encode(&self, job: &EncodeJob<'_>) -> Result<()>;
}

/// Pick the audio stream to process.
///
/// Returns the first stream whose language matches the earliest entry in
/// `priority` (case-insensitive), or the first stream when nothing matches.
#[must_use]
pub fn select_audio_stream<'a>(
    streams: &'a [AudioStream],
    priority: &[String],
) -> Option<&'a AudioStream> {
    priority
        .iter()
        .find_map(|wanted| {
            streams.iter().find(|s| {
                s.language
                    .as_deref()
                    .is_some_and(|lang| lang.eq_ignore_ascii_case(wanted))
            })
        })
        .or_else(|| streams.first())
}

/// Number of whole sample frames in `duration_secs` at `sample_rate`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn frames_for(duration_secs: f64, sample_rate: u32) -> u64 {
    (duration_secs.max(0.0) * f64::from(sample_rate)).round() as u64
}
