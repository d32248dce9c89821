//! External process execution.

use crate::error::{Error, Result};
use std::process::{Command, Stdio};
use tracing::debug;

/// Longest stderr excerpt kept in error messages.
const STDERR_EXCERPT_LEN: usize = 2000;

/// Run a command to completion and return its stdout.
///
/// A non-zero exit becomes [`Error::ToolFailed`] carrying the tail of the
/// captured stderr. A missing binary becomes [`Error::ToolNotFound`].
pub fn run_command(command: &mut Command, tool: &str) -> Result<Vec<u8>> {
    debug!("Running {tool}: {command:?}");

    let output = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ToolNotFound {
                tool: tool.to_string(),
            },
            _ => Error::Io(e),
        })?;

    if !output.status.success() {
        return Err(Error::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: stderr_excerpt(&output.stderr),
        });
    }

    Ok(output.stdout)
}

/// Last part of a stderr capture, trimmed and lossily decoded.
fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let start = text
        .char_indices()
        .rev()
        .nth(STDERR_EXCERPT_LEN - 1)
        .map_or(0, |(i, _)| i);
    text[start..].to_string()
}
