//! Source-separation models and the machinery that runs them per segment.

mod demucs;
mod executor;
mod runner;
mod spleeter;

pub use demucs::DemucsSeparator;
pub use executor::{CancellationToken, build_pool, execute_segments};
pub use runner::{SegmentResult, SegmentRunner};
pub use spleeter::SpleeterSeparator;

use crate::error::Result;
use std::path::{Path, PathBuf};

/// A pretrained model that extracts the vocal stem from an audio file.
///
/// Implementations are opaque transforms: given an input file and an
/// output directory they leave a vocal WAV at [`Separator::vocals_path`].
pub trait Separator: Send + Sync {
    /// Short model name used for directories and log messages.
    fn name(&self) -> &str;

    /// Where the vocal stem for `input` is written inside `out_dir`.
    fn vocals_path(&self, out_dir: &Path, input: &Path) -> PathBuf;

    /// Run the model on `input`, writing its stems under `out_dir`.
    fn separate(&self, input: &Path, out_dir: &Path) -> Result<()>;
}

/// File stem of `input`, or `"input"` when it has none.
pub(crate) fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map_or_else(|| "input".to_string(), |s| s.to_string_lossy().into_owned())
}
