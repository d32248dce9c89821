//! Final timing and duration correction against the source.

use super::align::{LagEstimate, estimate_lag};
use crate::audio::decode_audio_head;
use crate::config::ReconcileConfig;
use crate::error::Result;
use crate::media::{MediaTool, frames_for};
use std::path::Path;
use tracing::{debug, info, warn};

/// What reconciliation did to the fused track.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Silence inserted at the start, in samples of the fused track.
    pub delay_samples: u64,
    /// Final length in samples of the fused track.
    pub target_samples: u64,
    /// Sample rate of the fused track.
    pub sample_rate: u32,
    /// Source-to-fused lag estimate the delay was derived from.
    pub estimate: LagEstimate,
    /// Filter chain applied.
    pub filter: String,
}

/// Shift and pad/trim `fused` so it starts with and lasts exactly as long
/// as `source`, writing the result to `output`.
///
/// A positive source-to-fused lag means the fused track starts early and is
/// delayed by that amount. Offsets above `max_offset_ms` are treated as
/// implausible and ignored. Only the first `window_secs` of either file
/// are decoded; the target length comes from `source_duration`.
pub fn reconcile(
    media: &dyn MediaTool,
    fused: &Path,
    source: &Path,
    source_duration: f64,
    config: &ReconcileConfig,
    output: &Path,
) -> Result<Reconciliation> {
    let alignment = config.alignment();
    let fused_audio = decode_audio_head(fused, alignment.window_secs)?;
    let source_audio = decode_audio_head(source, alignment.window_secs)?;
    let rate = fused_audio.sample_rate;

    let estimate = estimate_lag(
        &source_audio.samples,
        source_audio.sample_rate,
        &fused_audio.samples,
        rate,
        &alignment,
    )?;

    let delay_samples = if estimate.lag_ms > config.max_offset_ms {
        warn!(
            "Ignoring implausible start offset of {:.1} ms (limit {:.0} ms)",
            estimate.lag_ms, config.max_offset_ms
        );
        0
    } else if estimate.lag_ms > 0.0 {
        frames_for(estimate.lag_ms / 1000.0, rate)
    } else {
        0
    };

    let target_samples = frames_for(source_duration, rate);
    let filter = build_reconcile_filter(delay_samples, target_samples);

    if delay_samples > 0 {
        info!("Delaying vocals by {:.1} ms", estimate.lag_ms);
    }
    debug!("Reconciling with filter {filter}");
    media.apply_filter(fused, &filter, output)?;

    Ok(Reconciliation {
        delay_samples,
        target_samples,
        sample_rate: rate,
        estimate,
        filter,
    })
}

/// Filter chain that delays by `delay` samples, then pads or trims to
/// exactly `length` samples.
#[must_use]
pub fn build_reconcile_filter(delay: u64, length: u64) -> String {
    let fit = format!("apad=whole_len={length},atrim=end_sample={length}");
    if delay > 0 {
        format!("adelay={delay}S:all=1,{fit}")
    } else {
        fit
    }
}
