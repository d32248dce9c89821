//! Ordered reassembly of per-segment model outputs.

use crate::audio::decode_audio_file;
use crate::error::{Error, Result};
use crate::media::{MediaInfo, MediaTool};
use crate::separation::SegmentResult;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Join per-segment vocal stems into one track at `output`.
///
/// Returns `Ok(None)` when there is nothing to join (no entries, or every
/// entry missing). A partially missing list is an error: joining around the
/// hole would shift everything after it. A single result is returned as is.
///
/// The join is a stream copy, so every piece must share one sample format.
/// Silence fallbacks are rewritten to the format of the model's own output
/// first (see [`conform_silence`]).
pub fn reassemble(
    media: &dyn MediaTool,
    model: &str,
    results: &[Option<SegmentResult>],
    output: &Path,
) -> Result<Option<PathBuf>> {
    let missing: Vec<usize> = results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.is_none().then_some(i))
        .collect();

    if missing.len() == results.len() {
        return Ok(None);
    }
    if !missing.is_empty() {
        return Err(Error::IncompleteModelTrack {
            model: model.to_string(),
            missing,
        });
    }

    let paths: Vec<&Path> = results.iter().flatten().map(SegmentResult::path).collect();
    if let [only] = paths.as_slice() {
        return Ok(Some(only.to_path_buf()));
    }

    conform_silence(media, model, results)?;

    let list_file = output.with_extension("concat.txt");
    std::fs::write(&list_file, build_concat_list(&paths)?)?;
    debug!("{model}: joining {} segments into {}", paths.len(), output.display());
    media.concat(&list_file, output)?;

    Ok(Some(output.to_path_buf()))
}

/// Sample rate and channel count of a WAV piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PieceFormat {
    sample_rate: u32,
    channels: u16,
}

fn piece_format(path: &Path, info: &MediaInfo) -> Result<PieceFormat> {
    info.audio_streams
        .first()
        .and_then(|s| {
            Some(PieceFormat {
                sample_rate: s.sample_rate?,
                channels: u16::try_from(s.channels?).ok()?,
            })
        })
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })
}

/// Rewrite silence pieces whose format differs from the model's output.
///
/// The reference format comes from the first piece the model actually
/// produced. Silence keeps its duration. A reused piece in a foreign format
/// is rewritten only when it is silent; otherwise the track cannot be
/// joined and an error is returned. Without any model-produced piece
/// nothing is changed.
pub fn conform_silence(
    media: &dyn MediaTool,
    model: &str,
    results: &[Option<SegmentResult>],
) -> Result<()> {
    let produced = |r: &&SegmentResult| matches!(r, SegmentResult::Separated(_));
    let Some(reference) = results.iter().flatten().find(produced) else {
        return Ok(());
    };
    let target = piece_format(reference.path(), &media.probe(reference.path())?)?;

    for piece in results.iter().flatten().filter(|r| !produced(r)) {
        let path = piece.path();
        let info = media.probe(path)?;
        if piece_format(path, &info)? == target {
            continue;
        }

        let silent = piece.is_silence()
            || decode_audio_file(path)?.samples.iter().all(|s| s.abs() < f32::EPSILON);
        if !silent {
            return Err(Error::SeparationFailed {
                model: model.to_string(),
                reason: format!(
                    "{} does not match the {} Hz, {} channel output of this run",
                    path.display(),
                    target.sample_rate,
                    target.channels
                ),
            });
        }

        let duration = info.duration.ok_or_else(|| Error::UnknownDuration {
            path: path.to_path_buf(),
        })?;
        let staging = path.with_extension("conformed.wav");
        media.silence(duration, target.sample_rate, target.channels, &staging)?;
        std::fs::rename(&staging, path)?;
        info!(
            "{model}: rewrote silence {} at {} Hz, {} channel(s)",
            path.display(),
            target.sample_rate,
            target.channels
        );
    }
    Ok(())
}

/// Render an ffmpeg concat demuxer list, one `file '<absolute path>'` per line.
///
/// Single quotes in paths are written as `'\''`.
pub fn build_concat_list(paths: &[&Path]) -> Result<String> {
    let mut list = String::new();
    for path in paths {
        let absolute = std::path::absolute(path)?;
        let escaped = absolute.to_string_lossy().replace('\'', r"'\''");
        let _ = writeln!(list, "file '{escaped}'");
    }
    Ok(list)
}
