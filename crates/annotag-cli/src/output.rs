//! Shared output layer for human/JSON parity across all CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: human-readable text by default, stable JSON with `--json`.

use clap::ValueEnum;
use serde::Serialize;
use std::io::{self, Write};

use annotag_core::ErrorCode;

/// The output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON (one object per result, or a JSON array).
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// A command failure with a stable code and an optional remediation hint.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}

impl CliError {
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            error: message.into(),
            code: code.code(),
            hint: code.hint(),
        }
    }
}

/// Render a value: JSON when requested, otherwise the given human closure.
///
/// # Errors
///
/// Returns an error when serialization or terminal writes fail.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut out, value)?;
        writeln!(out)?;
    } else {
        human(value, &mut out)?;
    }
    Ok(())
}

/// Render a one-line success message.
///
/// # Errors
///
/// Returns an error when serialization or terminal writes fail.
pub fn render_success(mode: OutputMode, message: &str) -> anyhow::Result<()> {
    #[derive(Serialize)]
    struct Success<'a> {
        ok: bool,
        message: &'a str,
    }
    render(
        mode,
        &Success { ok: true, message },
        |success, out| writeln!(out, "{}", success.message),
    )
}

/// Render a failure to stderr, with code and hint.
///
/// # Errors
///
/// Returns an error when serialization or terminal writes fail.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    if mode.is_json() {
        serde_json::to_writer_pretty(&mut out, error)?;
        writeln!(out)?;
    } else {
        writeln!(out, "error[{}]: {}", error.code, error.error)?;
        if let Some(hint) = error.hint {
            writeln!(out, "  hint: {hint}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_error_carries_code_and_hint() {
        let error = CliError::new("labels have a single parent", ErrorCode::DuplicateParent);
        assert_eq!(error.code, "E3002");
        assert!(error.hint.is_some());
    }

    #[test]
    fn json_mode_detection() {
        assert!(OutputMode::Json.is_json());
        assert!(!OutputMode::Human.is_json());
    }
}
