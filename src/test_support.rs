//! In-process doubles for the external tools, used by unit tests.

use crate::error::{Error, Result};
use crate::media::{AudioStream, EncodeJob, MediaInfo, MediaTool, frames_for};
use crate::pipeline::{Segment, segment_name};
use crate::separation::Separator;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Read a 16-bit WAV as interleaved f32 samples.
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .map(|s| s.map(|v| f32::from(v) / f32::from(i16::MAX)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
    Ok((samples, spec))
}

/// Write interleaved f32 samples as a 16-bit WAV.
pub fn write_frames(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let err = |e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };
    let mut writer = WavWriter::create(path, spec).map_err(err)?;
    for &s in samples {
        #[allow(clippy::cast_possible_truncation)]
        writer
            .write_sample((s.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16)
            .map_err(err)?;
    }
    writer.finalize().map_err(err)
}

/// Deterministic test signal, interleaved: a 440 Hz tone whose loudness
/// changes pseudo-randomly every 100 ms, so its envelope has no period.
#[allow(clippy::cast_precision_loss)]
pub fn tone(frames: usize, sample_rate: u32, channels: u16) -> Vec<f32> {
    let block = (sample_rate as usize / 10).max(1);
    let mut state: u64 = 0x2545_F491_4F6C_DD1D;
    let mut gain = 0.0f32;
    (0..frames)
        .flat_map(move |i| {
            if i % block == 0 {
                state ^= state << 13;
                state ^= state >> 7;
                state ^= state << 17;
                gain = (state >> 40) as f32 / (1u64 << 24) as f32;
            }
            let t = i as f32 / sample_rate as f32;
            let v = 0.6 * gain * (t * 440.0 * std::f32::consts::TAU).sin();
            std::iter::repeat_n(v, usize::from(channels))
        })
        .collect()
}

/// Write a stereo tone segment file under `dir/segments` and describe it.
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
pub fn segment_fixture(dir: &Path, index: usize, duration_secs: f64, sample_rate: u32) -> Segment {
    let name = segment_name(index);
    let seg_dir = dir.join("segments");
    std::fs::create_dir_all(&seg_dir).unwrap();
    let path = seg_dir.join(format!("{name}.wav"));
    let frames = frames_for(duration_secs, sample_rate) as usize;
    write_frames(&path, &tone(frames, sample_rate, 2), sample_rate, 2).unwrap();
    #[allow(clippy::cast_precision_loss)]
    let start_secs = index as f64 * duration_secs;
    Segment {
        index,
        name,
        path,
        start_secs,
        duration_secs,
        sample_rate,
        channels: 2,
    }
}

/// Media tool operating on WAV files with hound.
#[derive(Debug, Default)]
pub struct WavMediaTool {
    /// Make every `silence` call fail.
    pub fail_silence: bool,
}

impl MediaTool for WavMediaTool {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let (samples, spec) = read_wav(path)?;
        let frames = samples.len() / usize::from(spec.channels);
        #[allow(clippy::cast_precision_loss)]
        let duration = frames as f64 / f64::from(spec.sample_rate);
        Ok(MediaInfo {
            duration: Some(duration),
            has_video: false,
            audio_streams: vec![AudioStream {
                index: 0,
                language: None,
                codec: Some("pcm_s16le".to_string()),
                channels: Some(u32::from(spec.channels)),
                sample_rate: Some(spec.sample_rate),
            }],
        })
    }

    fn extract_audio(&self, input: &Path, _: Option<usize>, _: Option<f64>, output: &Path) -> Result<()> {
        std::fs::copy(input, output)?;
        Ok(())
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cut(&self, input: &Path, start_secs: f64, duration_secs: f64, output: &Path) -> Result<()> {
        let (samples, spec) = read_wav(input)?;
        let ch = usize::from(spec.channels);
        let start = frames_for(start_secs, spec.sample_rate) as usize * ch;
        let end = (start + frames_for(duration_secs, spec.sample_rate) as usize * ch).min(samples.len());
        write_frames(output, &samples[start.min(end)..end], spec.sample_rate, spec.channels)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn silence(&self, duration_secs: f64, sample_rate: u32, channels: u16, output: &Path) -> Result<()> {
        if self.fail_silence {
            return Err(Error::ToolFailed {
                tool: "ffmpeg".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "lavfi unavailable".to_string(),
            });
        }
        let n = frames_for(duration_secs, sample_rate) as usize * usize::from(channels);
        write_frames(output, &vec![0.0; n], sample_rate, channels)
    }

    fn concat(&self, list_file: &Path, output: &Path) -> Result<()> {
        let list = std::fs::read_to_string(list_file)?;
        let mut joined = Vec::new();
        let mut spec = None;
        for line in list.lines() {
            let Some(quoted) = line.strip_prefix("file '").and_then(|l| l.strip_suffix('\'')) else {
                continue;
            };
            let path = quoted.replace("'\\''", "'");
            let (samples, s) = read_wav(Path::new(&path))?;
            joined.extend(samples);
            spec.get_or_insert(s);
        }
        let spec = spec.ok_or(Error::NoSeparationOutput)?;
        write_frames(output, &joined, spec.sample_rate, spec.channels)
    }

    fn apply_filter(&self, input: &Path, filter: &str, output: &Path) -> Result<()> {
        let (samples, spec) = read_wav(input)?;
        write_frames(output, &apply_chain(&samples, spec.channels, filter), spec.sample_rate, spec.channels)
    }

    fn encode(&self, job: &EncodeJob<'_>) -> Result<()> {
        std::fs::copy(job.vocals, job.output)?;
        Ok(())
    }
}

/// Apply the `adelay`/`apad`/`atrim` subset of ffmpeg filters on frames.
pub fn apply_chain(samples: &[f32], channels: u16, filter: &str) -> Vec<f32> {
    let ch = usize::from(channels);
    let mut out = samples.to_vec();
    for stage in filter.split(',') {
        let (name, args) = stage.split_once('=').unwrap_or((stage, ""));
        let params: HashMap<&str, &str> = args
            .split(':')
            .filter_map(|kv| kv.split_once('='))
            .collect();
        match name {
            "adelay" => {
                let delay: usize = args
                    .split([':', '|'])
                    .next()
                    .and_then(|d| d.trim_end_matches('S').parse().ok())
                    .unwrap_or(0);
                let mut delayed = vec![0.0; delay * ch];
                delayed.extend_from_slice(&out);
                out = delayed;
            }
            "apad" => {
                if let Some(n) = params.get("whole_len").and_then(|n| n.parse::<usize>().ok())
                    && out.len() < n * ch
                {
                    out.resize(n * ch, 0.0);
                }
            }
            "atrim" => {
                if let Some(n) = params.get("end_sample").and_then(|n| n.parse::<usize>().ok()) {
                    out.truncate(n * ch);
                }
            }
            _ => {}
        }
    }
    out
}

/// Copy a WAV to `output` at `rate` by nearest-sample picking.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn write_at_rate(input: &Path, output: &Path, rate: u32) -> Result<()> {
    let (samples, spec) = read_wav(input)?;
    let ch = usize::from(spec.channels);
    let frames = samples.len() / ch;
    let duration = frames as f64 / f64::from(spec.sample_rate);
    let out_frames = frames_for(duration, rate) as usize;
    let ratio = f64::from(spec.sample_rate) / f64::from(rate);
    let resampled: Vec<f32> = (0..out_frames)
        .flat_map(|i| {
            let src = ((i as f64 * ratio) as usize).min(frames.saturating_sub(1));
            samples[src * ch..(src + 1) * ch].iter().copied()
        })
        .collect();
    write_frames(output, &resampled, rate, spec.channels)
}

/// What a scripted separator does when invoked.
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Copy the input to the vocal stem.
    Succeed,
    /// Always fail.
    Fail,
    /// Report success but leave an empty stem.
    EmptyOutput,
    /// Fail the first `n` calls, then succeed.
    FailTimes(usize),
    /// Fail on inputs whose stem is listed, succeed otherwise.
    FailOn(Vec<String>),
}

/// Separator double that follows a script.
#[derive(Debug)]
pub struct ScriptedSeparator {
    name: String,
    behavior: Behavior,
    delays: HashMap<String, Duration>,
    output_rate: Option<u32>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedSeparator {
    /// Create a separator with the given name and behavior.
    pub fn new(name: &str, behavior: Behavior) -> Self {
        Self {
            name: name.to_string(),
            behavior,
            delays: HashMap::new(),
            output_rate: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Sleep for `delay` when processing the input with stem `stem`.
    #[must_use]
    pub fn with_delay(mut self, stem: &str, delay: Duration) -> Self {
        self.delays.insert(stem.to_string(), delay);
        self
    }

    /// Write stems at `rate` instead of the input's rate, keeping duration.
    #[must_use]
    pub fn with_output_rate(mut self, rate: u32) -> Self {
        self.output_rate = Some(rate);
        self
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous invocations observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Separator for ScriptedSeparator {
    fn name(&self) -> &str {
        &self.name
    }

    fn vocals_path(&self, out_dir: &Path, input: &Path) -> PathBuf {
        out_dir
            .join(crate::separation::input_stem(input))
            .join("vocals.wav")
    }

    fn separate(&self, input: &Path, out_dir: &Path) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let stem = crate::separation::input_stem(input);
        if let Some(delay) = self.delays.get(&stem) {
            std::thread::sleep(*delay);
        }

        let fail = match &self.behavior {
            Behavior::Succeed | Behavior::EmptyOutput => false,
            Behavior::Fail => true,
            Behavior::FailTimes(n) => call < *n,
            Behavior::FailOn(stems) => stems.contains(&stem),
        };

        let result = if fail {
            Err(Error::SeparationFailed {
                model: self.name.clone(),
                reason: "scripted failure".to_string(),
            })
        } else {
            let vocals = self.vocals_path(out_dir, input);
            std::fs::create_dir_all(vocals.parent().unwrap_or(out_dir))
                .map_err(Error::from)
                .and_then(|()| match (&self.behavior, self.output_rate) {
                    (Behavior::EmptyOutput, _) => Ok(std::fs::write(&vocals, b"")?),
                    (_, Some(rate)) => write_at_rate(input, &vocals, rate),
                    (_, None) => Ok(std::fs::copy(input, &vocals).map(drop)?),
                })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
