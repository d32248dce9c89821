//! Configuration type definitions.

use crate::constants::{
    DEFAULT_MODEL_ATTEMPTS, DEFAULT_OUTPUT_DIR, DEFAULT_SEGMENT_SECS, DEFAULT_WORKERS, alignment,
    encoding, mix, models,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Segmentation and concurrency settings.
    pub processing: ProcessingConfig,

    /// Model-to-model alignment settings.
    pub alignment: AlignmentConfig,

    /// Fused-to-source reconciliation settings.
    pub reconcile: ReconcileConfig,

    /// Mixing weights.
    pub mix: MixConfig,

    /// Final audio encoding settings.
    pub audio: AudioConfig,

    /// Final video encoding settings.
    pub video: VideoConfig,

    /// Output location and container.
    pub output: OutputConfig,

    /// Separation model settings.
    pub models: ModelsConfig,

    /// External tool locations.
    pub tools: ToolsConfig,
}

/// Segmentation and concurrency settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Maximum concurrent model invocations.
    pub workers: usize,

    /// Segment length in seconds for long inputs.
    pub segment_duration: f64,

    /// Run both models at the same time instead of one after another.
    pub concurrent_models: bool,

    /// Keep temporary files for diagnosis.
    pub keep_temp: bool,

    /// Persistent working directory (enables resuming interrupted runs).
    pub work_dir: Option<PathBuf>,

    /// Attempts per model invocation before falling back to silence.
    pub model_attempts: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            segment_duration: DEFAULT_SEGMENT_SECS,
            concurrent_models: false,
            keep_temp: false,
            work_dir: None,
            model_attempts: DEFAULT_MODEL_ATTEMPTS,
        }
    }
}

/// Cross-correlation parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AlignmentConfig {
    /// Search window around zero lag, in seconds.
    pub max_delay_secs: f64,

    /// Required ratio of peak to mean absolute correlation.
    pub confidence_ratio: f64,

    /// Required normalized correlation coefficient at the peak.
    pub min_coefficient: f64,

    /// Amount of audio analyzed, in seconds.
    pub window_secs: f64,

    /// Envelope smoothing window, in seconds.
    pub envelope_secs: f64,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            max_delay_secs: alignment::MAX_DELAY_SECS,
            confidence_ratio: alignment::CONFIDENCE_RATIO,
            min_coefficient: alignment::MIN_COEFFICIENT,
            window_secs: alignment::WINDOW_SECS,
            envelope_secs: alignment::ENVELOPE_SECS,
        }
    }
}

/// Duration reconciliation settings.
///
/// Same correlation parameters as [`AlignmentConfig`], with its own
/// defaults: the source still carries the music, so its envelope matches
/// the vocals less closely than two model outputs match each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Search window around zero lag, in seconds.
    pub max_delay_secs: f64,

    /// Required ratio of peak to mean absolute correlation.
    pub confidence_ratio: f64,

    /// Required normalized correlation coefficient at the peak.
    pub min_coefficient: f64,

    /// Amount of audio analyzed, in seconds.
    pub window_secs: f64,

    /// Envelope smoothing window, in seconds.
    pub envelope_secs: f64,

    /// Start offsets above this many milliseconds are ignored.
    pub max_offset_ms: f64,
}

impl ReconcileConfig {
    /// Correlation parameters for the fused-to-source estimate.
    #[must_use]
    pub fn alignment(&self) -> AlignmentConfig {
        AlignmentConfig {
            max_delay_secs: self.max_delay_secs,
            confidence_ratio: self.confidence_ratio,
            min_coefficient: self.min_coefficient,
            window_secs: self.window_secs,
            envelope_secs: self.envelope_secs,
        }
    }

    /// Replace the correlation parameters, keeping `max_offset_ms`.
    pub fn set_alignment(&mut self, alignment: AlignmentConfig) {
        self.max_delay_secs = alignment.max_delay_secs;
        self.confidence_ratio = alignment.confidence_ratio;
        self.min_coefficient = alignment.min_coefficient;
        self.window_secs = alignment.window_secs;
        self.envelope_secs = alignment.envelope_secs;
    }
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            max_delay_secs: alignment::MAX_DELAY_SECS,
            confidence_ratio: alignment::CONFIDENCE_RATIO,
            min_coefficient: alignment::RECONCILE_MIN_COEFFICIENT,
            window_secs: alignment::WINDOW_SECS,
            envelope_secs: alignment::ENVELOPE_SECS,
            max_offset_ms: alignment::MAX_RECONCILE_OFFSET_MS,
        }
    }
}

/// Mixing weights for the two model tracks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MixConfig {
    /// Weight of the first model (Spleeter).
    pub primary_weight: f32,

    /// Weight of the second model (Demucs).
    pub secondary_weight: f32,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            primary_weight: mix::PRIMARY_WEIGHT,
            secondary_weight: mix::SECONDARY_WEIGHT,
        }
    }
}

/// Final audio encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Audio codec passed to ffmpeg.
    pub codec: String,

    /// Audio bitrate (e.g. "192k"), or none for the codec default.
    pub bitrate: Option<String>,

    /// Apply EBU R128 loudness normalization.
    pub normalize: bool,

    /// Preferred stream languages, highest priority first.
    pub language_priority: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            codec: encoding::AUDIO_CODEC.to_string(),
            bitrate: Some(encoding::AUDIO_BITRATE.to_string()),
            normalize: true,
            language_priority: Vec::new(),
        }
    }
}

/// Final video encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    /// Video codec passed to ffmpeg ("copy" keeps the original stream).
    pub codec: String,

    /// Video bitrate (e.g. "1800k"), or none.
    pub bitrate: Option<String>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            codec: encoding::VIDEO_CODEC.to_string(),
            bitrate: None,
        }
    }
}

/// Output location and container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Container format for video inputs.
    pub format: String,

    /// Destination directory.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: encoding::OUTPUT_FORMAT.to_string(),
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

/// Settings for both separation models.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelsConfig {
    /// Spleeter settings.
    pub spleeter: ModelConfig,

    /// Demucs settings.
    pub demucs: ModelConfig,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            spleeter: ModelConfig::with_model(models::SPLEETER_MODEL),
            demucs: ModelConfig::with_model(models::DEMUCS_MODEL),
        }
    }
}

/// Settings for one separation model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    /// Whether this model takes part in the run.
    pub enabled: bool,

    /// Python interpreter with the model package installed.
    pub python: String,

    /// Model name or descriptor.
    pub model: String,

    /// Compute device (e.g. "cuda", "cpu"); only used by Demucs.
    pub device: Option<String>,
}

impl ModelConfig {
    fn with_model(model: &str) -> Self {
        Self {
            enabled: true,
            python: models::PYTHON.to_string(),
            model: model.to_string(),
            device: None,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::with_model("")
    }
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolsConfig {
    /// ffmpeg binary name or path.
    pub ffmpeg: String,

    /// ffprobe binary name or path.
    pub ffprobe: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
        }
    }
}
