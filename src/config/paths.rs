//! Where nomusic looks for its settings.
//!
//! An explicit `--config` path (or `NOMUSIC_CONFIG`) always wins; otherwise
//! the file lives in the platform config directory:
//!
//! - Linux: `~/.config/nomusic/config.toml`
//! - macOS: `~/Library/Application Support/nomusic/config.toml`
//! - Windows: `%APPDATA%\nomusic\config\config.toml`

use crate::constants::{APP_NAME, CONFIG_FILE_NAME};
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Platform configuration directory for nomusic.
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Default settings file inside [`config_dir`].
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Settings file in effect: `explicit` when given, else the platform default.
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit.map_or_else(config_file_path, |path| Ok(path.to_path_buf()))
}
