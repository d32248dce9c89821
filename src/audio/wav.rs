//! WAV file writing.

use crate::error::{Error, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::Path;

/// Write samples to a 16-bit PCM WAV file.
///
/// `samples` are interleaved when `channels > 1` and are clamped to
/// [-1.0, 1.0]. Parent directories must already exist.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) -> Result<()> {
    let spec = WavSpec {
        channels: channels.max(1),
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let wav_err = |e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let pcm = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
        writer.write_sample(pcm).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)
}
