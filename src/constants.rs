//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "nomusic";

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default number of concurrent model invocations.
pub const DEFAULT_WORKERS: usize = 2;

/// Default segment length in seconds (10 minutes).
///
/// Inputs at or below this length are separated in one pass.
pub const DEFAULT_SEGMENT_SECS: f64 = 600.0;

/// Default number of attempts per model invocation (1 = no retry).
pub const DEFAULT_MODEL_ATTEMPTS: u32 = 1;

/// Default output directory for finished files.
pub const DEFAULT_OUTPUT_DIR: &str = "nomusic";

/// File name every separation model writes the vocal stem to.
pub const VOCALS_FILE_NAME: &str = "vocals.wav";

/// Name of the extracted working copy inside the run directory.
pub const WORKING_AUDIO_NAME: &str = "source.wav";

/// Rate of the extracted working copy; both separation models write their
/// stems at this rate.
pub const MODEL_SAMPLE_RATE: u32 = 44_100;

/// Directory holding physical segment files inside the run directory.
pub const SEGMENTS_DIR_NAME: &str = "segments";

/// Cross-correlation alignment defaults.
pub mod alignment {
    /// Search window around zero lag, in seconds.
    pub const MAX_DELAY_SECS: f64 = 2.0;

    /// Required ratio of peak to mean absolute correlation.
    pub const CONFIDENCE_RATIO: f64 = 2.0;

    /// Required normalized correlation coefficient at the peak.
    pub const MIN_COEFFICIENT: f64 = 0.3;

    /// Coefficient floor when matching the fused vocals against the source,
    /// whose envelope also carries the music.
    pub const RECONCILE_MIN_COEFFICIENT: f64 = 0.15;

    /// Amount of audio fed to the correlation, in seconds.
    pub const WINDOW_SECS: f64 = 120.0;

    /// Moving-average window for the energy envelope, in seconds.
    pub const ENVELOPE_SECS: f64 = 0.05;

    /// Offsets above this are treated as implausible during reconciliation.
    pub const MAX_RECONCILE_OFFSET_MS: f64 = 1000.0;
}

/// Mixing defaults.
pub mod mix {
    /// Weight of the first model's vocals.
    pub const PRIMARY_WEIGHT: f32 = 0.5;

    /// Weight of the second model's vocals.
    pub const SECONDARY_WEIGHT: f32 = 0.5;
}

/// Encoding defaults.
pub mod encoding {
    /// Audio codec for the final artifact.
    pub const AUDIO_CODEC: &str = "aac";

    /// Audio bitrate for the final artifact.
    pub const AUDIO_BITRATE: &str = "192k";

    /// Video codec used when remuxing (stream copy).
    pub const VIDEO_CODEC: &str = "copy";

    /// Output container for video inputs.
    pub const OUTPUT_FORMAT: &str = "mp4";

    /// EBU R128 loudness normalization filter.
    pub const LOUDNORM_FILTER: &str = "loudnorm=I=-23:TP=-2:LRA=7";
}

/// Separation model defaults.
pub mod models {
    /// Python interpreter used to launch the models.
    pub const PYTHON: &str = "python";

    /// Demucs model name.
    pub const DEMUCS_MODEL: &str = "htdemucs";

    /// Spleeter model descriptor.
    pub const SPLEETER_MODEL: &str = "spleeter:2stems";
}

/// Progress percentages reported at the start of each stage.
pub mod progress {
    /// Extracting the working copy.
    pub const EXTRACTING: u8 = 0;
    /// Separation window start.
    pub const SEPARATING_START: u8 = 10;
    /// Separation window end.
    pub const SEPARATING_END: u8 = 80;
    /// Aligning model tracks.
    pub const ALIGNING: u8 = 80;
    /// Mixing model tracks.
    pub const MIXING: u8 = 85;
    /// Reconciling duration with the source.
    pub const RECONCILING: u8 = 90;
    /// Encoding the final artifact.
    pub const ENCODING: u8 = 95;
    /// Finished.
    pub const DONE: u8 = 100;
}

/// Recognized input extensions.
pub mod extensions {
    /// Video containers.
    pub const VIDEO: &[&str] = &["mp4", "mkv", "mov", "avi", "flv", "webm", "wmv"];

    /// Audio-only formats.
    pub const AUDIO: &[&str] = &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma"];
}
