//! Per-run working directory and artifact paths.

use crate::constants::{SEGMENTS_DIR_NAME, WORKING_AUDIO_NAME};
use crate::error::{Error, Result};
use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

enum RunDir {
    Temp(TempDir),
    Persistent(PathBuf),
}

/// Everything one run writes to disk.
///
/// Owned by the orchestrator and torn down by [`RunContext::finish`].
pub struct RunContext {
    source: PathBuf,
    stream: Option<usize>,
    workers: usize,
    keep_temp: bool,
    dir: RunDir,
}

impl RunContext {
    /// Create the run directory for `source`.
    ///
    /// With `work_dir` set the run lives in `<work_dir>/<stem>-<hash>` (see
    /// [`run_dir_name`]) and survives failures so a later run can resume.
    /// Otherwise a fresh temporary directory is used.
    pub fn create(
        source: &Path,
        work_dir: Option<&Path>,
        keep_temp: bool,
        workers: usize,
    ) -> Result<Self> {
        let dir = match work_dir {
            Some(root) => {
                let path = root.join(run_dir_name(source));
                std::fs::create_dir_all(&path).map_err(|e| Error::DirCreateFailed {
                    path: path.clone(),
                    source: e,
                })?;
                RunDir::Persistent(path)
            }
            None => RunDir::Temp(
                tempfile::Builder::new()
                    .prefix("nomusic-")
                    .tempdir()
                    .map_err(|e| Error::DirCreateFailed {
                        path: std::env::temp_dir(),
                        source: e,
                    })?,
            ),
        };

        let ctx = Self {
            source: source.to_path_buf(),
            stream: None,
            workers,
            keep_temp,
            dir,
        };
        debug!("Run directory: {}", ctx.dir().display());
        Ok(ctx)
    }

    /// Input file being processed.
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Selected audio stream index, once probing has happened.
    #[must_use]
    pub fn stream(&self) -> Option<usize> {
        self.stream
    }

    /// Record the selected audio stream.
    pub fn set_stream(&mut self, index: Option<usize>) {
        self.stream = index;
    }

    /// Worker count for this run.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Root of the run directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        match &self.dir {
            RunDir::Temp(tmp) => tmp.path(),
            RunDir::Persistent(path) => path,
        }
    }

    /// Extracted stereo working copy.
    #[must_use]
    pub fn working_audio(&self) -> PathBuf {
        self.dir().join(WORKING_AUDIO_NAME)
    }

    /// Directory for physical segment files.
    #[must_use]
    pub fn segments_dir(&self) -> PathBuf {
        self.dir().join(SEGMENTS_DIR_NAME)
    }

    /// Output directory of one model.
    #[must_use]
    pub fn model_dir(&self, model: &str) -> PathBuf {
        self.dir().join(model)
    }

    /// Reassembled vocal track of one model.
    #[must_use]
    pub fn model_track(&self, model: &str) -> PathBuf {
        self.dir().join(format!("{model}_vocals.wav"))
    }

    /// Mixed (or single-model) mono track.
    #[must_use]
    pub fn fused_track(&self) -> PathBuf {
        self.dir().join("fused.wav")
    }

    /// Fused track after reconciliation with the source.
    #[must_use]
    pub fn final_track(&self) -> PathBuf {
        self.dir().join("final.wav")
    }

    /// Release the run directory.
    ///
    /// Temporaries are kept when `keep_temp` was requested, and a persistent
    /// work directory is kept after a failed run so it can be resumed.
    /// Returns the directory when it was kept.
    pub fn finish(self, success: bool) -> Option<PathBuf> {
        let keep = self.keep_temp;
        match self.dir {
            RunDir::Temp(tmp) if keep => {
                let path = tmp.keep();
                info!("Temporary files kept in {}", path.display());
                Some(path)
            }
            RunDir::Temp(tmp) => {
                let path = tmp.path().to_path_buf();
                if let Err(e) = tmp.close() {
                    warn!("Failed to remove {}: {e}", path.display());
                }
                None
            }
            RunDir::Persistent(path) if keep || !success => {
                info!("Work files kept in {}", path.display());
                Some(path)
            }
            RunDir::Persistent(path) => {
                if let Err(e) = std::fs::remove_dir_all(&path) {
                    warn!("Failed to remove {}: {e}", path.display());
                }
                None
            }
        }
    }
}

/// Persistent run directory name for `source`: its file stem plus a short
/// digest of its absolute path, so same-named inputs in different folders
/// (or with different extensions) never share resume state.
#[must_use]
pub fn run_dir_name(source: &Path) -> String {
    let absolute = std::fs::canonicalize(source)
        .or_else(|_| std::path::absolute(source))
        .unwrap_or_else(|_| source.to_path_buf());
    let digest = Sha256::digest(absolute.as_os_str().as_encoded_bytes());

    let mut name = source
        .file_stem()
        .map_or_else(|| "input".to_string(), |s| s.to_string_lossy().into_owned());
    name.push('-');
    for byte in &digest[..6] {
        let _ = write!(name, "{byte:02x}");
    }
    name
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_dir_removed_on_finish() {
        let ctx = RunContext::create(Path::new("/in/show.mkv"), None, false, 2).unwrap();
        let dir = ctx.dir().to_path_buf();
        assert!(dir.is_dir());
        assert!(ctx.working_audio().starts_with(&dir));
        assert_eq!(ctx.finish(true), None);
        assert!(!dir.exists());
    }

    #[test]
    fn test_keep_temp_retains_dir() {
        let ctx = RunContext::create(Path::new("show.mkv"), None, true, 2).unwrap();
        let dir = ctx.dir().to_path_buf();
        let kept = ctx.finish(true).unwrap();
        assert_eq!(kept, dir);
        assert!(kept.is_dir());
        std::fs::remove_dir_all(kept).unwrap();
    }

    #[test]
    fn test_work_dir_kept_after_failure_only() {
        let root = tempfile::tempdir().unwrap();

        let run = root.path().join(run_dir_name(Path::new("/in/show.mkv")));

        let ctx = RunContext::create(Path::new("/in/show.mkv"), Some(root.path()), false, 2).unwrap();
        assert_eq!(ctx.dir(), run);
        assert_eq!(ctx.model_dir("demucs"), run.join("demucs"));
        assert!(ctx.finish(false).is_some());
        assert!(run.is_dir());

        let ctx = RunContext::create(Path::new("/in/show.mkv"), Some(root.path()), false, 2).unwrap();
        assert_eq!(ctx.dir(), run);
        assert!(ctx.finish(true).is_none());
        assert!(!run.exists());
    }

    #[test]
    fn test_run_dir_name_is_stable_and_keeps_stem() {
        let name = run_dir_name(Path::new("/in/show.mkv"));
        assert_eq!(name, run_dir_name(Path::new("/in/show.mkv")));
        let (stem, hash) = name.split_once('-').unwrap();
        assert_eq!(stem, "show");
        assert_eq!(hash.len(), 12);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_same_stem_inputs_get_separate_work_dirs() {
        let root = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let a = inputs.path().join("a").join("ep1.mkv");
        let b = inputs.path().join("b").join("ep1.mkv");
        let c = inputs.path().join("a").join("ep1.mp4");
        for path in [&a, &b, &c] {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, b"media").unwrap();
        }

        let dirs: Vec<PathBuf> = [&a, &b, &c]
            .iter()
            .map(|source| {
                let ctx = RunContext::create(source, Some(root.path()), true, 1).unwrap();
                ctx.finish(false).unwrap()
            })
            .collect();
        assert_ne!(dirs[0], dirs[1]);
        assert_ne!(dirs[0], dirs[2]);
        assert_ne!(dirs[1], dirs[2]);
        assert!(dirs.iter().all(|d| d.starts_with(root.path())));
    }

    #[test]
    fn test_relative_and_absolute_paths_share_work_dir() {
        let inputs = tempfile::tempdir().unwrap();
        let file = inputs.path().join("talk.wav");
        std::fs::write(&file, b"media").unwrap();
        let dotted = inputs.path().join(".").join("talk.wav");
        assert_eq!(run_dir_name(&file), run_dir_name(&dotted));
    }

    #[test]
    fn test_stream_selection_recorded() {
        let mut ctx = RunContext::create(Path::new("a.mp4"), None, false, 3).unwrap();
        assert_eq!(ctx.stream(), None);
        ctx.set_stream(Some(2));
        assert_eq!(ctx.stream(), Some(2));
        assert_eq!(ctx.workers(), 3);
        assert_eq!(ctx.source(), Path::new("a.mp4"));
        ctx.finish(true);
    }
}
