//! In-process audio I/O: decoding, resampling and WAV writing.

mod decode;
mod resample;
mod wav;

pub use decode::{DecodedAudio, decode_audio_file, decode_audio_head};
pub use resample::{expected_output_len, resample};
pub use wav::write_wav;
