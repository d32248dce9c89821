//! Time alignment of two waveforms by envelope cross-correlation.
//!
//! Both signals are reduced to a normalized energy envelope and correlated
//! through the FFT. The lag with the highest correlation inside the search
//! window wins, provided it stands out from the rest of the window and is
//! strong in absolute terms.

use crate::audio::resample;
use crate::config::AlignmentConfig;
use crate::error::Result;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;
use std::borrow::Cow;
use tracing::debug;

/// Result of a lag search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagEstimate {
    /// Offset in samples at `sample_rate`. Positive means the first signal
    /// trails the second. Zero when not confident.
    pub lag_samples: i64,
    /// The same offset in milliseconds.
    pub lag_ms: f64,
    /// Rate both signals were compared at.
    pub sample_rate: u32,
    /// Correlation at the best lag.
    pub peak: f64,
    /// Mean absolute correlation over the search window.
    pub mean_abs: f64,
    /// Peak divided by the shorter envelope length (about 1.0 for identical
    /// signals, near 0.0 for unrelated ones).
    pub coefficient: f64,
    /// Whether the peak passed both confidence tests.
    pub confident: bool,
}

impl LagEstimate {
    fn rejected(sample_rate: u32, peak: f64, mean_abs: f64, coefficient: f64) -> Self {
        Self {
            lag_samples: 0,
            lag_ms: 0.0,
            sample_rate,
            peak,
            mean_abs,
            coefficient,
            confident: false,
        }
    }
}

/// Estimate how far `a` is shifted relative to `b`.
///
/// The higher-rate signal is resampled down to the lower rate; only the
/// first `window_secs` of each are analyzed.
pub fn estimate_lag(
    a: &[f32],
    rate_a: u32,
    b: &[f32],
    rate_b: u32,
    config: &AlignmentConfig,
) -> Result<LagEstimate> {
    let rate = rate_a.min(rate_b);
    let a = to_rate(head(a, config.window_secs, rate_a), rate_a, rate)?;
    let b = to_rate(head(b, config.window_secs, rate_b), rate_b, rate)?;

    let limit = secs_to_samples(config.window_secs, rate).max(1);
    let a = &a[..a.len().min(limit)];
    let b = &b[..b.len().min(limit)];
    if a.is_empty() || b.is_empty() {
        return Ok(LagEstimate::rejected(rate, 0.0, 0.0, 0.0));
    }

    let window = secs_to_samples(config.envelope_secs, rate);
    let env_a = envelope(a, window);
    let env_b = envelope(b, window);
    let correlation = cross_correlate(&env_a, &env_b);

    let max_lag = i64::try_from(secs_to_samples(config.max_delay_secs, rate)).unwrap_or(i64::MAX);
    let lo = -max_lag.min(len_i64(env_b.len()) - 1);
    let hi = max_lag.min(len_i64(env_a.len()) - 1);
    let at = |lag: i64| correlation.at(lag);

    let mut best_lag = lo;
    let mut peak = f64::NEG_INFINITY;
    let mut abs_sum = 0.0;
    for lag in lo..=hi {
        let value = at(lag);
        abs_sum += value.abs();
        if value > peak {
            peak = value;
            best_lag = lag;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_abs = abs_sum / (hi - lo + 1) as f64;
    #[allow(clippy::cast_precision_loss)]
    let coefficient = peak / env_a.len().min(env_b.len()) as f64;

    let confident = mean_abs > 0.0
        && peak > 0.0
        && peak >= config.confidence_ratio * mean_abs
        && coefficient >= config.min_coefficient;

    debug!(
        "Correlation peak {peak:.2} at lag {best_lag} (mean {mean_abs:.2}, coefficient {coefficient:.3}, confident: {confident})"
    );

    if !confident {
        return Ok(LagEstimate::rejected(rate, peak.max(0.0), mean_abs, coefficient));
    }

    #[allow(clippy::cast_precision_loss)]
    let lag_ms = best_lag as f64 / f64::from(rate) * 1000.0;
    Ok(LagEstimate {
        lag_samples: best_lag,
        lag_ms,
        sample_rate: rate,
        peak,
        mean_abs,
        coefficient,
        confident,
    })
}

/// The first `secs` seconds of `samples` at `rate`.
fn head(samples: &[f32], secs: f64, rate: u32) -> &[f32] {
    &samples[..samples.len().min(secs_to_samples(secs, rate).max(1))]
}

fn to_rate(samples: &[f32], from: u32, to: u32) -> Result<Cow<'_, [f32]>> {
    if from == to {
        Ok(Cow::Borrowed(samples))
    } else {
        resample(samples.to_vec(), from, to).map(Cow::Owned)
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn secs_to_samples(secs: f64, rate: u32) -> usize {
    (secs.max(0.0) * f64::from(rate)).round() as usize
}

fn len_i64(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

/// Absolute value, centered moving average of `window` samples, then
/// zero mean and unit variance (when the variance is non-zero).
fn envelope(samples: &[f32], window: usize) -> Vec<f64> {
    let abs: Vec<f64> = samples.iter().map(|s| f64::from(s.abs())).collect();

    let mut env = if window > 1 {
        let mut prefix = Vec::with_capacity(abs.len() + 1);
        prefix.push(0.0);
        let mut acc = 0.0;
        for v in &abs {
            acc += v;
            prefix.push(acc);
        }
        let ahead = (window - 1) / 2;
        let behind = window - 1 - ahead;
        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / window as f64;
        (0..abs.len())
            .map(|i| {
                let start = i.saturating_sub(behind);
                let end = (i + ahead + 1).min(abs.len());
                (prefix[end] - prefix[start]) * scale
            })
            .collect()
    } else {
        abs
    };

    #[allow(clippy::cast_precision_loss)]
    let n = env.len() as f64;
    let mean = env.iter().sum::<f64>() / n;
    let std = (env.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    for v in &mut env {
        *v -= mean;
        if std > 0.0 {
            *v /= std;
        }
    }
    env
}

/// Full cross-correlation `c[k] = sum(a[n + k] * b[n])` in circular layout.
struct Correlation {
    values: Vec<f64>,
}

impl Correlation {
    /// Value at `lag`; negative lags wrap to the end of the buffer.
    fn at(&self, lag: i64) -> f64 {
        let n = len_i64(self.values.len());
        let index = if lag >= 0 { lag } else { n + lag };
        usize::try_from(index)
            .ok()
            .and_then(|i| self.values.get(i))
            .copied()
            .unwrap_or(0.0)
    }
}

fn cross_correlate(a: &[f64], b: &[f64]) -> Correlation {
    let size = (a.len() + b.len() - 1).next_power_of_two();
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(size);
    let inverse = planner.plan_fft_inverse(size);

    let padded = |x: &[f64]| {
        let mut buf = vec![Complex::new(0.0, 0.0); size];
        for (slot, &v) in buf.iter_mut().zip(x) {
            slot.re = v;
        }
        buf
    };
    let mut fa = padded(a);
    let mut fb = padded(b);
    forward.process(&mut fa);
    forward.process(&mut fb);

    for (x, y) in fa.iter_mut().zip(&fb) {
        *x *= y.conj();
    }
    inverse.process(&mut fa);

    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / size as f64;
    Correlation {
        values: fa.iter().map(|c| c.re * scale).collect(),
    }
}
