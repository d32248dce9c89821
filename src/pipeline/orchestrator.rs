//! Runs one input through the whole separation-fusion pipeline.

use super::align::{LagEstimate, estimate_lag};
use super::context::RunContext;
use super::coordinator::{audio_output_for, output_path_for};
use super::mix::{MixWeights, mix_tracks};
use super::reassemble::reassemble;
use super::reconcile::{Reconciliation, reconcile};
use super::segment::{Segment, SegmentSpan, plan_segments, split_segments};
use crate::audio::{decode_audio_file, resample, write_wav};
use crate::config::Config;
use crate::constants::progress;
use crate::error::{Error, Result};
use crate::media::{EncodeJob, MediaTool, select_audio_stream};
use crate::output::ProgressSink;
use crate::separation::{
    CancellationToken, SegmentResult, SegmentRunner, Separator, build_pool, execute_segments,
};
use crate::utils::retry::RetryPolicy;
use rayon::ThreadPool;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, warn};

/// Stage of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    /// Probing the input and extracting the working copy.
    Extracting,
    /// Running a model (or several, joined with `+`) over the segments.
    Separating {
        /// Model name(s).
        model: String,
    },
    /// Estimating the offset between the two model tracks.
    Aligning,
    /// Summing the aligned tracks.
    Mixing,
    /// Matching start and length to the source.
    Reconciling,
    /// Writing the final artifact.
    Encoding,
    /// Finished successfully.
    Done {
        /// Written artifact.
        output: PathBuf,
    },
    /// Stopped with an error.
    Failed {
        /// Most specific description of what went wrong.
        cause: String,
    },
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Extracting => f.write_str("extracting"),
            Self::Separating { model } => write!(f, "separating ({model})"),
            Self::Aligning => f.write_str("aligning"),
            Self::Mixing => f.write_str("mixing"),
            Self::Reconciling => f.write_str("reconciling"),
            Self::Encoding => f.write_str("encoding"),
            Self::Done { .. } => f.write_str("done"),
            Self::Failed { cause } => write!(f, "failed: {cause}"),
        }
    }
}

/// Reassembled vocal track of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTrack {
    /// Model name.
    pub model: String,
    /// Reassembled waveform.
    pub path: PathBuf,
    /// Segments the model separated in this run.
    pub separated: usize,
    /// Segments reused from an earlier run.
    pub resumed: usize,
    /// Segments replaced by silence.
    pub silence: usize,
}

impl ModelTrack {
    fn from_results(model: &str, path: PathBuf, results: &[Option<SegmentResult>]) -> Self {
        let mut track = Self {
            model: model.to_string(),
            path,
            separated: 0,
            resumed: 0,
            silence: 0,
        };
        for result in results.iter().flatten() {
            match result {
                SegmentResult::Separated(_) => track.separated += 1,
                SegmentResult::Resumed(_) => track.resumed += 1,
                SegmentResult::Silence(_) => track.silence += 1,
            }
        }
        track
    }
}

/// Everything a run produced, successful or not.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Terminal state: `Done` or `Failed`.
    pub state: RunState,
    /// Model tracks that survived separation.
    pub tracks: Vec<ModelTrack>,
    /// Offset between the two model tracks, when both existed.
    pub lag: Option<LagEstimate>,
    /// What reconciliation did, when it ran.
    pub reconciliation: Option<Reconciliation>,
    /// Run directory left on disk, if any.
    pub kept_dir: Option<PathBuf>,
}

impl RunOutcome {
    fn new() -> Self {
        Self {
            state: RunState::Extracting,
            tracks: Vec::new(),
            lag: None,
            reconciliation: None,
            kept_dir: None,
        }
    }

    /// Written artifact, when the run finished.
    #[must_use]
    pub fn output(&self) -> Option<&Path> {
        match &self.state {
            RunState::Done { output } => Some(output),
            _ => None,
        }
    }

    /// Whether the run finished successfully.
    #[must_use]
    pub fn is_done(&self) -> bool {
        matches!(self.state, RunState::Done { .. })
    }
}

/// Drives one input from extraction to the final encode.
pub struct Orchestrator<'a> {
    config: &'a Config,
    media: &'a dyn MediaTool,
    separators: &'a [Box<dyn Separator>],
    progress: &'a dyn ProgressSink,
    cancel: CancellationToken,
}

impl<'a> Orchestrator<'a> {
    /// Create an orchestrator.
    ///
    /// `separators` are run in order; the first is the primary track for
    /// mixing weights and lag sign.
    #[must_use]
    pub fn new(
        config: &'a Config,
        media: &'a dyn MediaTool,
        separators: &'a [Box<dyn Separator>],
        progress: &'a dyn ProgressSink,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            config,
            media,
            separators,
            progress,
            cancel,
        }
    }

    /// Process `input`, keeping only its first `limit_secs` when given.
    ///
    /// Never panics on pipeline errors; they end the run in
    /// [`RunState::Failed`].
    pub fn run(&self, input: &Path, limit_secs: Option<f64>) -> RunOutcome {
        let mut outcome = RunOutcome::new();
        info!("Processing: {}", input.display());

        match self.start(input, limit_secs, &mut outcome) {
            Ok(output) => {
                self.enter(&mut outcome, RunState::Done { output }, progress::DONE);
                self.progress.finish("done");
            }
            Err(e) => {
                error!("{} failed while {}: {e}", input.display(), outcome.state);
                outcome.state = RunState::Failed {
                    cause: e.to_string(),
                };
                self.progress.finish("failed");
            }
        }
        outcome
    }

    fn start(
        &self,
        input: &Path,
        limit_secs: Option<f64>,
        outcome: &mut RunOutcome,
    ) -> Result<PathBuf> {
        if !input.is_file() {
            return Err(Error::InputNotFound {
                path: input.to_path_buf(),
            });
        }

        let processing = &self.config.processing;
        let mut ctx = RunContext::create(
            input,
            processing.work_dir.as_deref(),
            processing.keep_temp,
            processing.workers,
        )?;
        let result = self.execute(&mut ctx, limit_secs, outcome);
        outcome.kept_dir = ctx.finish(result.is_ok());
        result
    }

    fn execute(
        &self,
        ctx: &mut RunContext,
        limit_secs: Option<f64>,
        outcome: &mut RunOutcome,
    ) -> Result<PathBuf> {
        let input = ctx.source().to_path_buf();

        self.enter(outcome, RunState::Extracting, progress::EXTRACTING);
        let info = self.media.probe(&input)?;
        let stream = select_audio_stream(&info.audio_streams, &self.config.audio.language_priority)
            .ok_or_else(|| Error::NoAudioTracks {
                path: input.clone(),
            })?;
        if info.audio_streams.len() > 1 {
            info!(
                "Using audio stream {} ({})",
                stream.index,
                stream.language.as_deref().unwrap_or("no language tag")
            );
        }
        ctx.set_stream(Some(stream.index));
        let source_rate = stream.sample_rate;

        let working = ctx.working_audio();
        self.media
            .extract_audio(&input, ctx.stream(), limit_secs, &working)?;
        let working_info = self.media.probe(&working)?;
        let working_stream =
            working_info
                .audio_streams
                .first()
                .ok_or_else(|| Error::NoAudioTracks {
                    path: working.clone(),
                })?;
        let sample_rate = working_stream
            .sample_rate
            .ok_or_else(|| Error::NoAudioTracks {
                path: working.clone(),
            })?;
        let channels = working_stream
            .channels
            .and_then(|c| u16::try_from(c).ok())
            .unwrap_or(2);
        self.checkpoint()?;

        let spans = plan_segments(
            &working,
            working_info.duration,
            self.config.processing.segment_duration,
        )?;
        let source_duration = spans.last().map_or(0.0, SegmentSpan::end_secs);
        let segments = split_segments(
            self.media,
            &working,
            &spans,
            sample_rate,
            channels,
            &ctx.segments_dir(),
        )?;
        info!(
            "{:.1}s of audio in {} segment(s)",
            source_duration,
            segments.len()
        );

        outcome.tracks = self.separate(ctx, &segments, outcome)?;

        let fused = ctx.fused_track();
        let tracks = outcome.tracks.clone();
        match tracks.as_slice() {
            [] => return Err(Error::NoSeparationOutput),
            [only] => {
                info!(
                    "Only {} produced vocals; skipping alignment and mixing",
                    only.model
                );
                let audio = decode_audio_file(&only.path)?;
                write_wav(&fused, &audio.samples, audio.sample_rate, 1)?;
            }
            [first, second, ..] => self.fuse(first, second, &fused, outcome)?,
        }
        self.checkpoint()?;

        self.enter(outcome, RunState::Reconciling, progress::RECONCILING);
        let final_track = ctx.final_track();
        outcome.reconciliation = Some(reconcile(
            self.media,
            &fused,
            &working,
            source_duration,
            &self.config.reconcile,
            &final_track,
        )?);
        self.checkpoint()?;

        self.enter(outcome, RunState::Encoding, progress::ENCODING);
        self.encode(
            &input,
            info.has_video,
            &final_track,
            source_rate.or(Some(sample_rate)),
        )
    }

    fn separate(
        &self,
        ctx: &RunContext,
        segments: &[Segment],
        outcome: &mut RunOutcome,
    ) -> Result<Vec<ModelTrack>> {
        let pool = build_pool(ctx.workers())?;
        let retry = RetryPolicy::with_attempts(self.config.processing.model_attempts);

        let tracks = if self.config.processing.concurrent_models && self.separators.len() > 1 {
            self.separate_concurrently(&pool, ctx, segments, retry, outcome)
        } else {
            self.separate_sequentially(&pool, ctx, segments, retry, outcome)?
        };
        self.checkpoint()?;
        Ok(tracks)
    }

    fn separate_sequentially(
        &self,
        pool: &ThreadPool,
        ctx: &RunContext,
        segments: &[Segment],
        retry: RetryPolicy,
        outcome: &mut RunOutcome,
    ) -> Result<Vec<ModelTrack>> {
        let count = self.separators.len();
        let window = progress::SEPARATING_END - progress::SEPARATING_START;
        let mut tracks = Vec::with_capacity(count);

        for (i, separator) in self.separators.iter().enumerate() {
            self.checkpoint()?;
            let start = progress::SEPARATING_START + share(window, i, count);
            let end = progress::SEPARATING_START + share(window, i + 1, count);
            let state = RunState::Separating {
                model: separator.name().to_string(),
            };
            let label = state.to_string();
            self.enter(outcome, state, start);

            let track = self.run_model(pool, separator.as_ref(), ctx, segments, retry, |done, total| {
                self.progress
                    .report(&label, start + share(end - start, done, total));
            });
            tracks.extend(track);
        }

        Ok(tracks)
    }

    fn separate_concurrently(
        &self,
        pool: &ThreadPool,
        ctx: &RunContext,
        segments: &[Segment],
        retry: RetryPolicy,
        outcome: &mut RunOutcome,
    ) -> Vec<ModelTrack> {
        let names: Vec<&str> = self.separators.iter().map(|s| s.name()).collect();
        let state = RunState::Separating {
            model: names.join(" + "),
        };
        let label = state.to_string();
        self.enter(outcome, state, progress::SEPARATING_START);

        let window = progress::SEPARATING_END - progress::SEPARATING_START;
        let total = segments.len() * self.separators.len();
        let completed = AtomicUsize::new(0);

        // One thread per model; both share the pool, which bounds the
        // number of model processes alive at once.
        std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .separators
                .iter()
                .map(|separator| {
                    let (label, completed) = (&label, &completed);
                    scope.spawn(move || {
                        self.run_model(pool, separator.as_ref(), ctx, segments, retry, |_, _| {
                            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                            self.progress.report(
                                label,
                                progress::SEPARATING_START + share(window, done, total),
                            );
                        })
                    })
                })
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        warn!("A model thread panicked; its track is discarded");
                        None
                    })
                })
                .collect()
        })
    }

    fn run_model<F>(
        &self,
        pool: &ThreadPool,
        separator: &dyn Separator,
        ctx: &RunContext,
        segments: &[Segment],
        retry: RetryPolicy,
        on_complete: F,
    ) -> Option<ModelTrack>
    where
        F: FnMut(usize, usize),
    {
        let model = separator.name();
        let runner = SegmentRunner::new(separator, self.media, ctx.model_dir(model), retry);
        let results = execute_segments(pool, &runner, segments, &self.cancel, on_complete);
        if self.cancel.is_cancelled() {
            return None;
        }

        let all_silence = !results.is_empty()
            && results
                .iter()
                .all(|r| r.as_ref().is_some_and(SegmentResult::is_silence));
        if all_silence {
            warn!("{model} failed on every segment; dropping its track");
            return None;
        }

        match reassemble(self.media, model, &results, &ctx.model_track(model)) {
            Ok(Some(path)) => {
                let track = ModelTrack::from_results(model, path, &results);
                info!(
                    "{model}: {} separated, {} resumed, {} silent",
                    track.separated, track.resumed, track.silence
                );
                Some(track)
            }
            Ok(None) => {
                warn!("{model} produced no output");
                None
            }
            Err(e) => {
                warn!("{model} track discarded: {e}");
                None
            }
        }
    }

    fn fuse(
        &self,
        first: &ModelTrack,
        second: &ModelTrack,
        fused: &Path,
        outcome: &mut RunOutcome,
    ) -> Result<()> {
        self.enter(outcome, RunState::Aligning, progress::ALIGNING);
        let a = decode_audio_file(&first.path)?;
        let b = decode_audio_file(&second.path)?;
        let rate = a.sample_rate.min(b.sample_rate);
        let a_samples = to_rate(a.samples, a.sample_rate, rate)?;
        let b_samples = to_rate(b.samples, b.sample_rate, rate)?;

        let lag = estimate_lag(&a_samples, rate, &b_samples, rate, &self.config.alignment)?;
        if lag.confident {
            info!(
                "{} trails {} by {:.1} ms",
                first.model, second.model, lag.lag_ms
            );
        } else {
            info!("No confident offset between model tracks; mixing unshifted");
        }
        outcome.lag = Some(lag);
        self.checkpoint()?;

        self.enter(outcome, RunState::Mixing, progress::MIXING);
        let mixed = mix_tracks(
            &a_samples,
            &b_samples,
            lag.lag_samples,
            &MixWeights::from(&self.config.mix),
        );
        if mixed.normalized {
            debug!("Mixture exceeded full scale and was normalized");
        }
        write_wav(fused, &mixed.samples, rate, 1)
    }

    fn encode(
        &self,
        input: &Path,
        is_video: bool,
        vocals: &Path,
        sample_rate: Option<u32>,
    ) -> Result<PathBuf> {
        let config = self.config;
        let output_dir = &config.output.dir;
        std::fs::create_dir_all(output_dir).map_err(|e| Error::DirCreateFailed {
            path: output_dir.clone(),
            source: e,
        })?;
        let output = output_path_for(input, output_dir, is_video, &config.output.format);

        let audio_bitrate = config.audio.bitrate.as_deref();
        let (audio_codec, audio_bitrate) = if is_video {
            (config.audio.codec.as_str(), audio_bitrate)
        } else {
            let container = audio_output_for(input);
            (
                container.codec.unwrap_or(config.audio.codec.as_str()),
                audio_bitrate.filter(|_| container.uses_bitrate),
            )
        };

        let job = EncodeJob {
            vocals,
            output: &output,
            video_source: is_video.then_some(input),
            audio_codec,
            audio_bitrate,
            video_codec: &config.video.codec,
            video_bitrate: config.video.bitrate.as_deref(),
            normalize: config.audio.normalize,
            sample_rate,
        };

        if let Err(e) = self.media.encode(&job) {
            if output.exists()
                && let Err(rm) = std::fs::remove_file(&output)
            {
                warn!("Failed to remove partial output {}: {rm}", output.display());
            }
            return Err(e);
        }

        info!("Wrote {}", output.display());
        Ok(output)
    }

    fn enter(&self, outcome: &mut RunOutcome, state: RunState, percent: u8) {
        debug!("Stage: {state}");
        self.progress.report(&state.to_string(), percent);
        outcome.state = state;
    }

    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// `done / total` of `window` percent points.
fn share(window: u8, done: usize, total: usize) -> u8 {
    let points = usize::from(window) * done / total.max(1);
    u8::try_from(points.min(usize::from(window))).unwrap_or(window)
}

fn to_rate(samples: Vec<f32>, from: u32, to: u32) -> Result<Vec<f32>> {
    if from == to {
        Ok(samples)
    } else {
        debug!("Resampling model track from {from} Hz to {to} Hz");
        resample(samples, from, to)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::media::frames_for;
    use crate::output::NoProgress;
    use crate::test_support::{Behavior, ScriptedSeparator, WavMediaTool, read_wav, tone, write_frames};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingProgress {
        reports: Mutex<Vec<(String, u8)>>,
    }

    impl ProgressSink for RecordingProgress {
        fn report(&self, stage: &str, percent: u8) {
            self.reports.lock().unwrap().push((stage.to_string(), percent));
        }
    }

    impl RecordingProgress {
        fn percents(&self) -> Vec<u8> {
            self.reports.lock().unwrap().iter().map(|(_, p)| *p).collect()
        }

        fn stages(&self) -> Vec<String> {
            self.reports.lock().unwrap().iter().map(|(s, _)| s.clone()).collect()
        }
    }

    const RATE: u32 = 8000;

    fn fixture(dir: &Path, secs: f64) -> (PathBuf, Config) {
        let input = dir.join("talk show.wav");
        let frames = frames_for(secs, RATE) as usize;
        write_frames(&input, &tone(frames, RATE, 2), RATE, 2).unwrap();

        let mut config = Config::default();
        config.output.dir = dir.join("out");
        config.processing.segment_duration = 2.0;
        (input, config)
    }

    fn separators(a: Behavior, b: Behavior) -> Vec<Box<dyn Separator>> {
        vec![
            Box::new(ScriptedSeparator::new("spleeter", a)),
            Box::new(ScriptedSeparator::new("demucs", b)),
        ]
    }

    #[test]
    fn test_two_models_fused_to_source_length() {
        let dir = tempfile::tempdir().unwrap();
        let (input, config) = fixture(dir.path(), 5.0);
        let media = WavMediaTool::default();
        let seps = separators(Behavior::Succeed, Behavior::Succeed);
        let progress = RecordingProgress::default();

        let outcome = Orchestrator::new(&config, &media, &seps, &progress, CancellationToken::new())
            .run(&input, None);

        assert!(outcome.is_done(), "{:?}", outcome.state);
        let output = outcome.output().unwrap();
        assert_eq!(output, dir.path().join("out").join("talk show_vocals.wav"));
        let (samples, spec) = read_wav(output).unwrap();
        assert_eq!(spec.channels, 1);
        assert_eq!(samples.len() as u64, frames_for(5.0, RATE));

        assert_eq!(outcome.tracks.len(), 2);
        assert!(outcome.tracks.iter().all(|t| t.separated == 3 && t.silence == 0));
        assert_eq!(outcome.lag.unwrap().lag_samples, 0);

        let percents = progress.percents();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
        assert_eq!(percents.last(), Some(&100));
        let stages = progress.stages();
        for stage in ["extracting", "separating (spleeter)", "separating (demucs)", "aligning", "mixing", "reconciling", "encoding", "done"] {
            assert!(stages.iter().any(|s| s == stage), "missing {stage}");
        }
    }

    #[test]
    fn test_single_track_mode_skips_alignment() {
        let dir = tempfile::tempdir().unwrap();
        let (input, config) = fixture(dir.path(), 3.0);
        let media = WavMediaTool::default();
        let seps = separators(Behavior::Fail, Behavior::Succeed);
        let progress = RecordingProgress::default();

        let outcome = Orchestrator::new(&config, &media, &seps, &progress, CancellationToken::new())
            .run(&input, None);

        assert!(outcome.is_done(), "{:?}", outcome.state);
        assert_eq!(outcome.tracks.len(), 1);
        assert_eq!(outcome.tracks[0].model, "demucs");
        assert!(outcome.lag.is_none());
        assert!(!progress.stages().iter().any(|s| s == "aligning" || s == "mixing"));
    }

    #[test]
    fn test_partial_model_failure_keeps_track() {
        let dir = tempfile::tempdir().unwrap();
        let (input, config) = fixture(dir.path(), 5.0);
        let media = WavMediaTool::default();
        let seps = separators(Behavior::FailOn(vec!["part_001".to_string()]), Behavior::Succeed);

        let outcome = Orchestrator::new(&config, &media, &seps, &NoProgress, CancellationToken::new())
            .run(&input, None);

        assert!(outcome.is_done(), "{:?}", outcome.state);
        let spleeter = &outcome.tracks[0];
        assert_eq!((spleeter.separated, spleeter.silence), (2, 1));
        let (samples, _) = read_wav(outcome.output().unwrap()).unwrap();
        assert_eq!(samples.len() as u64, frames_for(5.0, RATE));
    }

    #[test]
    fn test_no_separation_output_fails_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let (input, config) = fixture(dir.path(), 3.0);
        let media = WavMediaTool::default();
        let seps = separators(Behavior::Fail, Behavior::Fail);

        let outcome = Orchestrator::new(&config, &media, &seps, &NoProgress, CancellationToken::new())
            .run(&input, None);

        assert_eq!(
            outcome.state,
            RunState::Failed {
                cause: "no separation output available".to_string()
            }
        );
        assert!(!dir.path().join("out").join("talk show_vocals.wav").exists());
        assert!(outcome.kept_dir.is_none());
    }

    #[test]
    fn test_concurrent_models_produce_both_tracks() {
        let dir = tempfile::tempdir().unwrap();
        let (input, mut config) = fixture(dir.path(), 5.0);
        config.processing.concurrent_models = true;
        let media = WavMediaTool::default();
        let seps = separators(Behavior::Succeed, Behavior::Succeed);
        let progress = RecordingProgress::default();

        let outcome = Orchestrator::new(&config, &media, &seps, &progress, CancellationToken::new())
            .run(&input, None);

        assert!(outcome.is_done(), "{:?}", outcome.state);
        let models: Vec<_> = outcome.tracks.iter().map(|t| t.model.as_str()).collect();
        assert_eq!(models, vec!["spleeter", "demucs"]);
        assert!(progress.stages().iter().any(|s| s == "separating (spleeter + demucs)"));
        assert!(progress.percents().contains(&progress::SEPARATING_END));
    }

    #[test]
    fn test_cancelled_run_fails() {
        let dir = tempfile::tempdir().unwrap();
        let (input, config) = fixture(dir.path(), 3.0);
        let media = WavMediaTool::default();
        let seps = separators(Behavior::Succeed, Behavior::Succeed);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = Orchestrator::new(&config, &media, &seps, &NoProgress, cancel).run(&input, None);

        assert_eq!(
            outcome.state,
            RunState::Failed {
                cause: "processing cancelled".to_string()
            }
        );
    }

    #[test]
    fn test_missing_input_fails_before_models_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let media = WavMediaTool::default();
        let seps = separators(Behavior::Succeed, Behavior::Succeed);

        let outcome = Orchestrator::new(&config, &media, &seps, &NoProgress, CancellationToken::new())
            .run(&dir.path().join("missing.mp4"), None);

        assert!(matches!(&outcome.state, RunState::Failed { cause } if cause.starts_with("input file not found")));
        assert!(outcome.tracks.is_empty());
    }

    #[test]
    fn test_share() {
        assert_eq!(share(70, 0, 4), 0);
        assert_eq!(share(70, 2, 4), 35);
        assert_eq!(share(70, 4, 4), 70);
        assert_eq!(share(70, 5, 4), 70);
        assert_eq!(share(35, 1, 0), 35);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(RunState::Separating { model: "demucs".into() }.to_string(), "separating (demucs)");
        assert_eq!(
            RunState::Failed { cause: "boom".into() }.to_string(),
            "failed: boom"
        );
    }
}
