//! Error types for nomusic.

use std::path::PathBuf;

/// Result type alias for nomusic operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for nomusic.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// No supported media files found.
    #[error("no supported video or audio files found in the provided paths")]
    NoValidInputFiles,

    /// Input file does not exist or cannot be read.
    #[error("input file not found: {path}")]
    InputNotFound {
        /// Path to the missing input.
        path: PathBuf,
    },

    /// Duration of a media file could not be determined.
    #[error("could not determine duration of '{path}'")]
    UnknownDuration {
        /// Path to the probed file.
        path: PathBuf,
    },

    /// An external tool binary could not be located.
    #[error("'{tool}' not found (install it or set its path in the [tools] config section)")]
    ToolNotFound {
        /// Name or configured path of the tool.
        tool: String,
    },

    /// An external tool exited unsuccessfully.
    #[error("{tool} failed ({status}): {stderr}")]
    ToolFailed {
        /// Name of the tool.
        tool: String,
        /// Exit status description.
        status: String,
        /// Captured diagnostic output.
        stderr: String,
    },

    /// Probe output could not be parsed.
    #[error("failed to parse probe output for '{path}'")]
    ProbeParse {
        /// Path to the probed file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the media file.
        path: PathBuf,
    },

    /// Failed to resample audio.
    #[error("failed to resample audio: {reason}")]
    Resample {
        /// Description of the resampling failure.
        reason: String,
    },

    /// Failed to write WAV file.
    #[error("failed to write WAV file '{path}'")]
    WavWriteFailed {
        /// Path to the WAV file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Failed to create a directory.
    #[error("failed to create directory '{path}'")]
    DirCreateFailed {
        /// Path to the directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A separation model invocation failed.
    #[error("{model} separation failed: {reason}")]
    SeparationFailed {
        /// Model name.
        model: String,
        /// Description of the failure.
        reason: String,
    },

    /// Some, but not all, segment results are missing for a model.
    #[error("{model} is missing results for segments {missing:?}")]
    IncompleteModelTrack {
        /// Model name.
        model: String,
        /// Indices of the missing segments.
        missing: Vec<usize>,
    },

    /// Neither separation model produced a usable vocal track.
    #[error("no separation output available")]
    NoSeparationOutput,

    /// One or more files in a batch failed.
    #[error("{failed} of {total} files failed")]
    FilesFailed {
        /// Number of failed files.
        failed: usize,
        /// Number of files attempted.
        total: usize,
    },

    /// Processing was cancelled.
    #[error("processing cancelled")]
    Cancelled,

    /// Failed to build a worker pool.
    #[error("failed to build worker pool: {reason}")]
    WorkerPool {
        /// Description of the failure.
        reason: String,
    },
}
