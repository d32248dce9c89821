//! Progress reporting for pipeline stages.

use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Receives `(stage, percent)` updates from a running pipeline.
///
/// Reporting is fire-and-forget and must never fail the run.
pub trait ProgressSink: Send + Sync {
    /// Record that `stage` has reached `percent` (0-100).
    fn report(&self, stage: &str, percent: u8);

    /// Called once when the run ends.
    fn finish(&self, _message: &str) {}
}

/// Terminal progress bar.
#[derive(Debug)]
pub struct IndicatifProgress {
    bar: ProgressBar,
}

impl IndicatifProgress {
    /// Create a percent bar labelled with `file_name`.
    #[must_use]
    pub fn new(file_name: &str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(&format!(
                    "{{spinner:.green}} [{{elapsed_precise}}] {{bar:40.cyan/blue}} {{pos:>3}}% {{msg}} - {file_name}"
                ))
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▓▒░ "),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }
}

impl ProgressSink for IndicatifProgress {
    fn report(&self, stage: &str, percent: u8) {
        self.bar.set_position(u64::from(percent.min(100)));
        self.bar.set_message(stage.to_string());
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// Sink that writes stage changes to the log.
#[derive(Debug, Default)]
pub struct LogProgress {
    last_stage: Mutex<Option<String>>,
}

impl ProgressSink for LogProgress {
    fn report(&self, stage: &str, percent: u8) {
        let changed = self.last_stage.lock().map_or(true, |mut last| {
            let changed = last.as_deref() != Some(stage);
            if changed {
                *last = Some(stage.to_string());
            }
            changed
        });
        if changed {
            info!("[{percent:>3}%] {stage}");
        } else {
            debug!("[{percent:>3}%] {stage}");
        }
    }
}

/// Sink that discards every update.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _stage: &str, _percent: u8) {}
}
