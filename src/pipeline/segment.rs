//! Time-based segmentation of long inputs.

use crate::error::{Error, Result};
use crate::media::MediaTool;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tolerance used when dividing the duration into segments, so float noise
/// never produces a sliver segment at the end.
const SPLIT_EPSILON: f64 = 1e-9;

/// A planned time range of the working copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    /// Start offset in seconds.
    pub start_secs: f64,
    /// Length in seconds.
    pub duration_secs: f64,
}

impl SegmentSpan {
    /// End offset in seconds (exclusive).
    #[must_use]
    pub fn end_secs(&self) -> f64 {
        self.start_secs + self.duration_secs
    }
}

/// A contiguous piece of the working copy processed as one model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Position in the original timeline (0-based), used for ordering only.
    pub index: usize,
    /// Stable name (`part_000`, `part_001`, ...).
    pub name: String,
    /// Audio file holding this segment.
    pub path: PathBuf,
    /// Start offset in seconds.
    pub start_secs: f64,
    /// Length in seconds.
    pub duration_secs: f64,
    /// Sample rate of the segment audio.
    pub sample_rate: u32,
    /// Channel count of the segment audio.
    pub channels: u16,
}

/// Plan how a file of `duration` seconds is divided.
///
/// Returns one span covering the whole file when `duration <= threshold`.
/// Otherwise returns `ceil(duration / threshold)` back-to-back spans of
/// `threshold` seconds, the last one holding the remainder.
pub fn plan_segments(
    path: &Path,
    duration: Option<f64>,
    threshold: f64,
) -> Result<Vec<SegmentSpan>> {
    let duration = duration
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| Error::UnknownDuration {
            path: path.to_path_buf(),
        })?;

    if !threshold.is_finite() || threshold <= 0.0 || duration <= threshold {
        return Ok(vec![SegmentSpan {
            start_secs: 0.0,
            duration_secs: duration,
        }]);
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = ((duration / threshold) - SPLIT_EPSILON).ceil().max(1.0) as usize;

    let spans = (0..count)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let start_secs = i as f64 * threshold;
            let duration_secs = if i + 1 == count {
                duration - start_secs
            } else {
                threshold
            };
            SegmentSpan {
                start_secs,
                duration_secs,
            }
        })
        .collect();

    Ok(spans)
}

/// Name of the segment at `index`.
#[must_use]
pub fn segment_name(index: usize) -> String {
    format!("part_{index:03}")
}

/// Turn planned spans into segment files.
///
/// A single span reuses `source` directly. Multiple spans are cut into
/// `dir/part_NNN.wav` through the media tool.
pub fn split_segments(
    media: &dyn MediaTool,
    source: &Path,
    spans: &[SegmentSpan],
    sample_rate: u32,
    channels: u16,
    dir: &Path,
) -> Result<Vec<Segment>> {
    if let [span] = spans {
        return Ok(vec![Segment {
            index: 0,
            name: segment_name(0),
            path: source.to_path_buf(),
            start_secs: span.start_secs,
            duration_secs: span.duration_secs,
            sample_rate,
            channels,
        }]);
    }

    std::fs::create_dir_all(dir).map_err(|e| Error::DirCreateFailed {
        path: dir.to_path_buf(),
        source: e,
    })?;

    spans
        .iter()
        .enumerate()
        .map(|(index, span)| {
            let name = segment_name(index);
            let path = dir.join(format!("{name}.wav"));
            debug!(
                "Cutting {name}: {:.3}s - {:.3}s",
                span.start_secs,
                span.end_secs()
            );
            media.cut(source, span.start_secs, span.duration_secs, &path)?;
            Ok(Segment {
                index,
                name,
                path,
                start_secs: span.start_secs,
                duration_secs: span.duration_secs,
                sample_rate,
                channels,
            })
        })
        .collect()
}
