//! Audio resampling using rubato.

use crate::error::{Error, Result};
use audioadapter_buffers::direct::SequentialSlice;
use rubato::{Fft, FixedSync, Resampler};

const CHUNK_SIZE: usize = 1024;

/// Resample mono audio to the target sample rate.
///
/// Returns the input unchanged if already at the target rate. The
/// resampler's processing delay is removed, so sample `i` of the output
/// lines up in time with sample `i * to_rate / from_rate` of the input.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(Error::Resample {
            reason: format!("invalid sample rates {from_rate} -> {to_rate}"),
        });
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        1,
        1,
        FixedSync::Both,
    )
    .map_err(|e| Error::Resample {
        reason: e.to_string(),
    })?;

    let wanted = expected_output_len(samples.len(), from_rate, to_rate);
    let delay = resampler.output_delay();
    let chunk = resampler.input_frames_next();
    let mut output = Vec::with_capacity(wanted + delay + CHUNK_SIZE);

    let mut pos = 0;
    let mut padded = vec![0.0f32; chunk];
    // Keep feeding (zero-padded past the end) until the delayed tail is out.
    while output.len() < wanted + delay {
        let available = samples.len().saturating_sub(pos).min(chunk);
        padded[..available].copy_from_slice(&samples[pos..pos + available]);
        padded[available..].fill(0.0);
        pos += available;

        let input = SequentialSlice::new(&padded, 1, chunk).map_err(|e| Error::Resample {
            reason: format!("failed to create input adapter: {e}"),
        })?;
        let resampled = resampler
            .process(&input, 0, None)
            .map_err(|e| Error::Resample {
                reason: e.to_string(),
            })?;
        output.extend_from_slice(&resampled.take_data());
    }

    output.drain(..delay.min(output.len()));
    output.truncate(wanted);
    Ok(output)
}

/// Number of output samples corresponding to `input_len` input samples.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn expected_output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    (input_len as f64 * f64::from(to_rate) / f64::from(from_rate)).round() as usize
}
