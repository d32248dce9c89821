//! Per-segment model invocation with silence fallback.

use super::Separator;
use crate::error::{Error, Result};
use crate::media::MediaTool;
use crate::pipeline::Segment;
use crate::utils::retry::{RetryPolicy, retry};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of one segment for one model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentResult {
    /// The model produced the vocal stem in this run.
    Separated(PathBuf),
    /// A non-empty stem from an earlier run was reused.
    Resumed(PathBuf),
    /// The model failed and silence of the segment's length was written.
    Silence(PathBuf),
}

impl SegmentResult {
    /// Path of the vocal stem.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Separated(path) | Self::Resumed(path) | Self::Silence(path) => path,
        }
    }

    /// Whether this result is a silence fallback.
    #[must_use]
    pub fn is_silence(&self) -> bool {
        matches!(self, Self::Silence(_))
    }
}

/// Runs one model over single segments.
pub struct SegmentRunner<'a> {
    separator: &'a dyn Separator,
    media: &'a dyn MediaTool,
    model_dir: PathBuf,
    retry: RetryPolicy,
}

impl<'a> SegmentRunner<'a> {
    /// Create a runner writing under `model_dir`.
    #[must_use]
    pub fn new(
        separator: &'a dyn Separator,
        media: &'a dyn MediaTool,
        model_dir: PathBuf,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            separator,
            media,
            model_dir,
            retry,
        }
    }

    /// Name of the model this runner drives.
    #[must_use]
    pub fn model_name(&self) -> &str {
        self.separator.name()
    }

    /// Expected vocal stem location for `segment`.
    #[must_use]
    pub fn expected_output(&self, segment: &Segment) -> PathBuf {
        self.separator
            .vocals_path(&self.segment_dir(segment), &segment.path)
    }

    fn segment_dir(&self, segment: &Segment) -> PathBuf {
        self.model_dir.join(&segment.name)
    }

    /// Produce the vocal stem for `segment`.
    ///
    /// Reuses an existing non-empty stem, otherwise invokes the model and
    /// falls back to silence when it fails. Returns `None` only when the
    /// fallback fails too.
    pub fn run(&self, segment: &Segment) -> Option<SegmentResult> {
        let model = self.model_name();
        let vocals = self.expected_output(segment);

        if is_non_empty(&vocals) {
            info!("{model}: reusing existing output for {}", segment.name);
            return Some(SegmentResult::Resumed(vocals));
        }

        let out_dir = self.segment_dir(segment);
        let label = format!("{model} on {}", segment.name);
        let attempt = retry(&self.retry, &label, || {
            std::fs::create_dir_all(&out_dir)?;
            self.separator.separate(&segment.path, &out_dir)?;
            if is_non_empty(&vocals) {
                Ok(())
            } else {
                Err(Error::SeparationFailed {
                    model: model.to_string(),
                    reason: format!("no vocal output at {}", vocals.display()),
                })
            }
        });

        match attempt {
            Ok(()) => {
                debug!("{model}: separated {}", segment.name);
                Some(SegmentResult::Separated(vocals))
            }
            Err(e) => {
                warn!("{model} failed on {}: {e}; substituting silence", segment.name);
                self.write_silence(segment, &vocals)
            }
        }
    }

    fn write_silence(&self, segment: &Segment, vocals: &Path) -> Option<SegmentResult> {
        let written = vocals
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .map_err(Error::from)
            .and_then(|()| {
                self.media.silence(
                    segment.duration_secs,
                    segment.sample_rate,
                    segment.channels,
                    vocals,
                )
            });

        match written {
            Ok(()) if is_non_empty(vocals) => Some(SegmentResult::Silence(vocals.to_path_buf())),
            Ok(()) => {
                warn!("{}: silence fallback for {} is empty", self.model_name(), segment.name);
                None
            }
            Err(e) => {
                warn!(
                    "{}: silence fallback for {} failed: {e}",
                    self.model_name(),
                    segment.name
                );
                None
            }
        }
    }
}

fn is_non_empty(path: &Path) -> bool {
    std::fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}
