//! Shared doubles for integration tests: a WAV-only media tool and
//! scripted separators.

#![allow(dead_code, clippy::unwrap_used, clippy::cast_possible_truncation)]

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use nomusic::media::{AudioStream, EncodeJob, MediaInfo, MediaTool, frames_for};
use nomusic::output::ProgressSink;
use nomusic::separation::Separator;
use nomusic::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn read(path: &Path) -> (Vec<i16>, WavSpec) {
    let reader = WavReader::open(path).unwrap();
    let spec = reader.spec();
    let samples = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
    (samples, spec)
}

pub fn write(path: &Path, samples: &[i16], sample_rate: u32, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).unwrap();
    for &s in samples {
        writer.write_sample(s).unwrap();
    }
    writer.finalize().unwrap();
}

/// Mono speech-like test signal: a tone whose level jumps every 100 ms.
pub fn write_tone(path: &Path, secs: f64, sample_rate: u32) {
    let frames = frames_for(secs, sample_rate) as usize;
    let block = (sample_rate as usize / 10).max(1);
    let mut state: u32 = 0x9E37_79B9;
    let mut gain = 0.0f32;
    let samples: Vec<i16> = (0..frames)
        .map(|i| {
            if i % block == 0 {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                gain = (state >> 8) as f32 / (1u32 << 24) as f32;
            }
            let t = i as f32 / sample_rate as f32;
            (gain * 12_000.0 * (t * 330.0 * std::f32::consts::TAU).sin()) as i16
        })
        .collect();
    write(path, &samples, sample_rate, 1);
}

/// Frame count of a WAV file.
pub fn frames(path: &Path) -> u64 {
    let (samples, spec) = read(path);
    (samples.len() / usize::from(spec.channels)) as u64
}

/// Media tool that understands 16-bit WAV only.
#[derive(Debug, Default)]
pub struct WavTool;

impl MediaTool for WavTool {
    fn probe(&self, path: &Path) -> Result<MediaInfo> {
        if !path.exists() {
            return Err(Error::InputNotFound {
                path: path.to_path_buf(),
            });
        }
        let (samples, spec) = read(path);
        let frames = samples.len() / usize::from(spec.channels);
        Ok(MediaInfo {
            duration: Some(frames as f64 / f64::from(spec.sample_rate)),
            has_video: false,
            audio_streams: vec![AudioStream {
                index: 0,
                language: Some("eng".to_string()),
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

    fn cut(&self, input: &Path, start_secs: f64, duration_secs: f64, output: &Path) -> Result<()> {
        let (samples, spec) = read(input);
        let ch = usize::from(spec.channels);
        let start = frames_for(start_secs, spec.sample_rate) as usize * ch;
        let end = (start + frames_for(duration_secs, spec.sample_rate) as usize * ch).min(samples.len());
        write(output, &samples[start.min(end)..end], spec.sample_rate, spec.channels);
        Ok(())
    }

    fn silence(&self, duration_secs: f64, sample_rate: u32, channels: u16, output: &Path) -> Result<()> {
        let n = frames_for(duration_secs, sample_rate) as usize * usize::from(channels);
        write(output, &vec![0; n], sample_rate, channels);
        Ok(())
    }

    fn concat(&self, list_file: &Path, output: &Path) -> Result<()> {
        let list = std::fs::read_to_string(list_file)?;
        let mut joined = Vec::new();
        let mut spec = None;
        for line in list.lines() {
            let path = line
                .strip_prefix("file '")
                .and_then(|l| l.strip_suffix('\''))
                .unwrap()
                .replace("'\\''", "'");
            let (samples, s) = read(Path::new(&path));
            joined.extend(samples);
            spec.get_or_insert(s);
        }
        let spec = spec.unwrap();
        write(output, &joined, spec.sample_rate, spec.channels);
        Ok(())
    }

    fn apply_filter(&self, input: &Path, filter: &str, output: &Path) -> Result<()> {
        let (mut samples, spec) = read(input);
        let ch = usize::from(spec.channels);
        for stage in filter.split(',') {
            let (name, arg) = stage.split_once('=').unwrap();
            let number = |prefix: &str| -> usize {
                arg.trim_start_matches(prefix)
                    .split([':', 'S'])
                    .next()
                    .unwrap()
                    .parse()
                    .unwrap()
            };
            match name {
                "adelay" => {
                    let mut delayed = vec![0; number("") * ch];
                    delayed.extend_from_slice(&samples);
                    samples = delayed;
                }
                "apad" => {
                    let n = number("whole_len=") * ch;
                    if samples.len() < n {
                        samples.resize(n, 0);
                    }
                }
                "atrim" => samples.truncate(number("end_sample=") * ch),
                other => panic!("unsupported filter {other}"),
            }
        }
        write(output, &samples, spec.sample_rate, spec.channels);
        Ok(())
    }

    fn encode(&self, job: &EncodeJob<'_>) -> Result<()> {
        std::fs::copy(job.vocals, job.output)?;
        Ok(())
    }
}

/// Separator that copies its input as the vocal stem, failing on listed
/// segment names.
#[derive(Debug)]
pub struct Scripted {
    name: String,
    fail_on: Option<Vec<String>>,
    calls: AtomicUsize,
}

impl Scripted {
    /// Succeeds on every segment.
    pub fn ok(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fail_on: Some(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails on the named segments.
    pub fn failing_on(name: &str, stems: &[&str]) -> Self {
        Self {
            fail_on: Some(stems.iter().map(|s| (*s).to_string()).collect()),
            ..Self::ok(name)
        }
    }

    /// Fails on every segment.
    pub fn broken(name: &str) -> Self {
        Self {
            fail_on: None,
            ..Self::ok(name)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Separator for Scripted {
    fn name(&self) -> &str {
        &self.name
    }

    fn vocals_path(&self, out_dir: &Path, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
        out_dir.join(stem).join("vocals.wav")
    }

    fn separate(&self, input: &Path, out_dir: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let stem = input.file_stem().unwrap().to_string_lossy().into_owned();
        let fails = self.fail_on.as_ref().is_none_or(|list| list.contains(&stem));
        if fails {
            return Err(Error::SeparationFailed {
                model: self.name.clone(),
                reason: "exit status: 1".to_string(),
            });
        }
        let vocals = self.vocals_path(out_dir, input);
        std::fs::create_dir_all(vocals.parent().unwrap())?;
        std::fs::copy(input, vocals)?;
        Ok(())
    }
}

/// Progress sink that records every report.
#[derive(Debug, Default)]
pub struct Recorder {
    pub reports: Mutex<Vec<(String, u8)>>,
}

impl ProgressSink for Recorder {
    fn report(&self, stage: &str, percent: u8) {
        self.reports.lock().unwrap().push((stage.to_string(), percent));
    }
}

impl Recorder {
    pub fn last(&self) -> Option<(String, u8)> {
        self.reports.lock().unwrap().last().cloned()
    }
}
