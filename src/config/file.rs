//! Configuration file loading.

use crate::config::{Config, sanitize_config};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Load configuration from a TOML file.
///
/// Returns default config if the file does not exist.
pub fn load_config_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| Error::ConfigParse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Load and sanitize configuration, falling back to defaults on any error.
///
/// Uses `path` when given, otherwise the platform-specific default path.
/// A malformed file never aborts a run: the problem is logged and the
/// documented defaults are used instead.
pub fn load_config_or_default(path: Option<&Path>) -> Config {
    let loaded = super::resolve_config_path(path)
        .map_or_else(|_| Ok(Config::default()), |path| load_config_file(&path));

    match loaded {
        Ok(config) => {
            debug!("Configuration loaded");
            sanitize_config(config)
        }
        Err(e) => {
            warn!("{e}; using default settings");
            Config::default()
        }
    }
}

/// Save configuration to a TOML file.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    // Create parent directories if they don't exist
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| Error::ConfigWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| Error::ConfigSerialize { source: e })?;

    std::fs::write(path, contents).map_err(|e| Error::ConfigWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
