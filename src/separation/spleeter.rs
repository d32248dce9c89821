//! Spleeter separation via its Python command-line entry point.

use super::{Separator, input_stem};
use crate::config::ModelConfig;
use crate::constants::VOCALS_FILE_NAME;
use crate::error::{Error, Result};
use crate::utils::process::run_command;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs `python -m spleeter separate`.
#[derive(Debug, Clone)]
pub struct SpleeterSeparator {
    python: String,
    model: String,
}

impl SpleeterSeparator {
    /// Create a separator from its configuration section.
    #[must_use]
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            python: config.python.clone(),
            model: config.model.clone(),
        }
    }

    fn command(&self, input: &Path, out_dir: &Path) -> Command {
        let mut command = Command::new(&self.python);
        command
            .args(["-m", "spleeter", "separate", "-p", &self.model, "-o"])
            .arg(out_dir)
            .arg(input);
        command
    }
}

impl Separator for SpleeterSeparator {
    fn name(&self) -> &str {
        "spleeter"
    }

    fn vocals_path(&self, out_dir: &Path, input: &Path) -> PathBuf {
        out_dir.join(input_stem(input)).join(VOCALS_FILE_NAME)
    }

    fn separate(&self, input: &Path, out_dir: &Path) -> Result<()> {
        run_command(&mut self.command(input, out_dir), "spleeter")
            .map(drop)
            .map_err(|e| Error::SeparationFailed {
                model: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}
