//! Demucs separation via its Python command-line entry point.

use super::{Separator, input_stem};
use crate::config::ModelConfig;
use crate::constants::VOCALS_FILE_NAME;
use crate::error::{Error, Result};
use crate::utils::process::run_command;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Runs `python -m demucs.separate`.
#[derive(Debug, Clone)]
pub struct DemucsSeparator {
    python: String,
    model: String,
    device: Option<String>,
}

impl DemucsSeparator {
    /// Create a separator from its configuration section.
    #[must_use]
    pub fn new(config: &ModelConfig) -> Self {
        Self {
            python: config.python.clone(),
            model: config.model.clone(),
            device: config.device.clone(),
        }
    }

    fn command(&self, input: &Path, out_dir: &Path) -> Command {
        let mut command = Command::new(&self.python);
        command.args(["-m", "demucs.separate", "-n", &self.model]);
        if let Some(device) = &self.device {
            command.args(["-d", device]);
        }
        command.arg("-o").arg(out_dir).arg(input);
        command
    }
}

impl Separator for DemucsSeparator {
    fn name(&self) -> &str {
        "demucs"
    }

    fn vocals_path(&self, out_dir: &Path, input: &Path) -> PathBuf {
        out_dir
            .join(&self.model)
            .join(input_stem(input))
            .join(VOCALS_FILE_NAME)
    }

    fn separate(&self, input: &Path, out_dir: &Path) -> Result<()> {
        run_command(&mut self.command(input, out_dir), "demucs")
            .map(drop)
            .map_err(|e| Error::SeparationFailed {
                model: self.name().to_string(),
                reason: e.to_string(),
            })
    }
}
