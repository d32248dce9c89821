//! FFmpeg/FFprobe backed media tool.

use super::{AudioStream, EncodeJob, MediaInfo, MediaTool, frames_for};
use crate::constants::MODEL_SAMPLE_RATE;
use crate::constants::encoding::LOUDNORM_FILTER;
use crate::error::{Error, Result};
use crate::utils::process::run_command;
use serde::Deserialize;
use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Collect heterogeneous string-like arguments into `Vec<OsString>`.
macro_rules! args {
    ($($arg:expr),* $(,)?) => {
        vec![$(OsString::from(AsRef::<std::ffi::OsStr>::as_ref(&$arg)),)*]
    };
}

/// Media tool driving the `ffmpeg` and `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Ffmpeg {
    /// Locate both binaries by name or path.
    pub fn new(ffmpeg: &str, ffprobe: &str) -> Result<Self> {
        let locate = |tool: &str| {
            which::which(tool).map_err(|_| Error::ToolNotFound {
                tool: tool.to_string(),
            })
        };
        let ffmpeg = locate(ffmpeg)?;
        let ffprobe = locate(ffprobe)?;
        debug!("Using {} and {}", ffmpeg.display(), ffprobe.display());
        Ok(Self { ffmpeg, ffprobe })
    }

    fn run_ffmpeg(&self, args: Vec<OsString>) -> Result<()> {
        let mut command = Command::new(&self.ffmpeg);
        command.args(["-y", "-hide_banner", "-loglevel", "error"]).args(args);
        run_command(&mut command, "ffmpeg").map(drop)
    }
}

impl MediaTool for Ffmpeg {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        if !path.exists() {
            return Err(Error::InputNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut command = Command::new(&self.ffprobe);
        command
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(path);
        let stdout = run_command(&mut command, "ffprobe")?;
        parse_probe_output(path, &stdout)
    }

    fn extract_audio(
        &self,
        input: &Path,
        stream: Option<usize>,
        limit_secs: Option<f64>,
        output: &Path,
    ) -> Result<()> {
        self.run_ffmpeg(extract_args(input, stream, limit_secs, output))
    }

    fn cut(&self, input: &Path, start_secs: f64, duration_secs: f64, output: &Path) -> Result<()> {
        self.run_ffmpeg(args![
            "-i",
            input,
            "-ss",
            secs(start_secs),
            "-t",
            secs(duration_secs),
            "-c:a",
            "pcm_s16le",
            output
        ])
    }

    fn silence(
        &self,
        duration_secs: f64,
        sample_rate: u32,
        channels: u16,
        output: &Path,
    ) -> Result<()> {
        let source = format!(
            "anullsrc=sample_rate={sample_rate}:channel_layout={}",
            channel_layout(channels)
        );
        let trim = format!("atrim=end_sample={}", frames_for(duration_secs, sample_rate));
        self.run_ffmpeg(args![
            "-f", "lavfi", "-i", source, "-af", trim, "-c:a", "pcm_s16le", output
        ])
    }

    fn concat(&self, list_file: &Path, output: &Path) -> Result<()> {
        self.run_ffmpeg(args![
            "-f", "concat", "-safe", "0", "-i", list_file, "-c", "copy", output
        ])
    }

    fn apply_filter(&self, input: &Path, filter: &str, output: &Path) -> Result<()> {
        self.run_ffmpeg(args!["-i", input, "-af", filter, "-c:a", "pcm_s16le", output])
    }

    fn encode(&self, job: &EncodeJob<'_>) -> Result<()> {
        self.run_ffmpeg(encode_args(job))
    }
}

/// Arguments extracting one audio stream as a stereo 16-bit working copy at
/// the models' sample rate.
fn extract_args(
    input: &Path,
    stream: Option<usize>,
    limit_secs: Option<f64>,
    output: &Path,
) -> Vec<OsString> {
    let mut args = args!["-i", input];
    if let Some(limit) = limit_secs {
        args.extend(args!["-t", secs(limit)]);
    }
    let map = stream.map_or_else(|| "0:a:0".to_string(), |index| format!("0:{index}"));
    args.extend(args![
        "-map",
        map,
        "-vn",
        "-ac",
        "2",
        "-ar",
        MODEL_SAMPLE_RATE.to_string(),
        "-c:a",
        "pcm_s16le",
        output
    ]);
    args
}

/// Build the ffmpeg arguments for the final encode (without global flags).
#[must_use]
pub fn encode_args(job: &EncodeJob<'_>) -> Vec<OsString> {
    let mut args = Vec::new();
    if let Some(source) = job.video_source {
        args.extend(args!["-i", source]);
    }
    args.extend(args!["-i", job.vocals]);

    if job.video_source.is_some() {
        args.extend(args!["-c:v", job.video_codec]);
        if let Some(bitrate) = job.video_bitrate {
            args.extend(args!["-b:v", bitrate]);
        }
    }

    args.extend(args!["-c:a", job.audio_codec]);
    if let Some(bitrate) = job.audio_bitrate {
        args.extend(args!["-b:a", bitrate]);
    }
    if job.normalize {
        args.extend(args!["-af", LOUDNORM_FILTER]);
    }
    if let Some(rate) = job.sample_rate {
        args.extend(args!["-ar", rate.to_string()]);
    }

    if job.video_source.is_some() {
        args.extend(args!["-map", "0:v:0", "-map", "1:a:0", "-shortest"]);
    }
    args.push(job.output.as_os_str().to_os_string());
    args
}

#[derive(Debug, Default, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    format: ProbeFormat,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: usize,
    codec_type: Option<String>,
    codec_name: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
    duration: Option<String>,
    #[serde(default)]
    tags: HashMap<String, String>,
    #[serde(default)]
    disposition: HashMap<String, i64>,
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
pub fn parse_probe_output(path: &Path, json: &[u8]) -> Result<MediaInfo> {
    let probe: ProbeOutput = serde_json::from_slice(json).map_err(|e| Error::ProbeParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let parse_secs = |s: &Option<String>| {
        s.as_deref()
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
    };

    let duration = parse_secs(&probe.format.duration).or_else(|| {
        probe
            .streams
            .iter()
            .filter_map(|s| parse_secs(&s.duration))
            .reduce(f64::max)
    });

    let has_video = probe.streams.iter().any(|s| {
        s.codec_type.as_deref() == Some("video")
            && s.disposition.get("attached_pic").copied().unwrap_or(0) == 0
    });

    let audio_streams = probe
        .streams
        .into_iter()
        .filter(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioStream {
            index: s.index,
            language: s
                .tags
                .get("language")
                .filter(|lang| !lang.is_empty() && *lang != "und")
                .cloned(),
            codec: s.codec_name,
            channels: s.channels,
            sample_rate: s.sample_rate.and_then(|r| r.parse().ok()),
        })
        .collect();

    Ok(MediaInfo {
        duration,
        has_video,
        audio_streams,
    })
}

fn channel_layout(channels: u16) -> String {
    match channels {
        0 | 1 => "mono".to_string(),
        2 => "stereo".to_string(),
        n => format!("{n}c"),
    }
}

fn secs(value: f64) -> String {
    format!("{value:.6}")
}
