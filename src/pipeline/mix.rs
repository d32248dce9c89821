//! Weighted mixing of two aligned model tracks.

use crate::config::MixConfig;

/// Per-track gain applied before summing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixWeights {
    /// Gain of the first track.
    pub first: f32,
    /// Gain of the second track.
    pub second: f32,
}

impl From<&MixConfig> for MixWeights {
    fn from(config: &MixConfig) -> Self {
        Self {
            first: config.primary_weight,
            second: config.secondary_weight,
        }
    }
}

/// Output of [`mix_tracks`].
#[derive(Debug, Clone, PartialEq)]
pub struct MixedTrack {
    /// Mono samples.
    pub samples: Vec<f32>,
    /// Whether the mixture was scaled down to avoid clipping.
    pub normalized: bool,
}

/// Align `a` and `b` by `lag` samples and sum them with `weights`.
///
/// A positive lag (`a` trails `b`) delays `b` by `lag` samples; a negative
/// lag delays `a`. The shorter result is padded with silence at the end.
/// If the sum peaks above 1.0 it is divided by its peak.
#[must_use]
pub fn mix_tracks(a: &[f32], b: &[f32], lag: i64, weights: &MixWeights) -> MixedTrack {
    let shift = usize::try_from(lag.unsigned_abs()).unwrap_or(usize::MAX);
    let (offset_a, offset_b) = if lag >= 0 { (0, shift) } else { (shift, 0) };
    let len = (a.len() + offset_a).max(b.len() + offset_b);

    let mut samples = vec![0.0f32; len];
    for (out, &s) in samples[offset_a..].iter_mut().zip(a) {
        *out += s * weights.first;
    }
    for (out, &s) in samples[offset_b..].iter_mut().zip(b) {
        *out += s * weights.second;
    }

    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    let normalized = peak > 1.0;
    if normalized {
        for s in &mut samples {
            *s /= peak;
        }
    }

    MixedTrack {
        samples,
        normalized,
    }
}
