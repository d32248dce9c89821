//! User-facing output: progress reporting.

mod progress;

pub use progress::{IndicatifProgress, LogProgress, NoProgress, ProgressSink};
