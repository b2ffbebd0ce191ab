//! How `cb` prints results and errors.
//!
//! Every command gets an [`OutputMode`] and prints through this module, so a
//! result reads the same whichever command produced it:
//!
//! - **pretty**: framed sections for a person at a terminal,
//! - **text**: one tab-separated row per record for `cut`/`awk`,
//! - **json**: the serde form of the result on stdout, and
//!   `{"error": {...}}` on stderr when the command fails.
//!
//! The mode comes from `--json`, then `FORMAT`, then the `output` key of the
//! user config, and finally from whether stdout is a terminal.

use corkboard_core::config::{load_user_config, resolve_output};
use corkboard_core::{CorkboardError, ErrorCode};
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

const RULE_WIDTH: usize = 60;

/// Heading plus a full-width rule.
pub fn section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    rule(w)
}

pub fn rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "─".repeat(RULE_WIDTH))
}

/// `Label:    value`, labels padded to one column.
pub fn field(w: &mut dyn Write, label: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<10}{}", format!("{label}:"), value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    Text,
    Json,
}

impl OutputMode {
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }

    fn from_name(name: &str) -> Self {
        match name {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            _ => Self::Text,
        }
    }
}

/// Pick the mode for this run. A broken user config falls through to the
/// next source instead of failing, so the real error can still be shown.
pub fn resolve_output_mode(json_flag: bool) -> OutputMode {
    let configured = load_user_config().ok().and_then(|user| user.output);
    let env_format = std::env::var("FORMAT").ok();
    OutputMode::from_name(resolve_output(
        json_flag,
        configured.as_deref(),
        env_format.as_deref(),
    ))
}

/// A record that knows its pretty and text forms. The JSON form is its
/// serde representation.
pub trait Renderable: Serialize {
    /// Column names printed once above text rows.
    const COLUMNS: &'static [&'static str] = &[];

    fn render_human(&self, w: &mut dyn Write) -> io::Result<()>;

    fn render_row(&self, w: &mut dyn Write) -> io::Result<()>;
}

/// Write one record to `w`.
pub fn emit_item<R: Renderable>(w: &mut dyn Write, item: &R, mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Pretty => item.render_human(w)?,
        OutputMode::Text => item.render_row(w)?,
        OutputMode::Json => write_json(w, item)?,
    }
    Ok(())
}

/// Write a sequence of records to `w`. JSON mode emits one array.
pub fn emit_list<R: Renderable>(w: &mut dyn Write, items: &[R], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => write_json(w, items)?,
        OutputMode::Pretty => {
            if items.is_empty() {
                writeln!(w, "(no issues)")?;
            }
            for item in items {
                item.render_human(w)?;
            }
        }
        OutputMode::Text => {
            if !items.is_empty() && !R::COLUMNS.is_empty() {
                writeln!(w, "{}", R::COLUMNS.join("\t"))?;
            }
            for item in items {
                item.render_row(w)?;
            }
        }
    }
    Ok(())
}

pub fn print_item<R: Renderable>(item: &R, mode: OutputMode) -> anyhow::Result<()> {
    emit_item(&mut io::stdout().lock(), item, mode)
}

pub fn print_list<R: Renderable>(items: &[R], mode: OutputMode) -> anyhow::Result<()> {
    emit_list(&mut io::stdout().lock(), items, mode)
}

/// Print a one-off result: serde JSON in JSON mode, `human` otherwise.
pub fn print_with<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let mut out = io::stdout().lock();
    if mode.is_json() {
        write_json(&mut out, value)?;
    } else {
        human(value, &mut out)?;
    }
    Ok(())
}

fn write_json<T: Serialize + ?Sized>(w: &mut dyn Write, value: &T) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *w, value)?;
    writeln!(w)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A failure as reported to the user. Serialized under `"error"` in JSON
/// mode.
#[derive(Debug, Clone, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Stable `E####` code from [`ErrorCode`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// An error with no code, for CLI usage mistakes.
    pub fn plain(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            error_code: None,
        }
    }

    /// An error carrying `code` and the code's standard hint.
    pub fn coded(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }

    #[must_use]
    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CliError {}

impl From<&CorkboardError> for CliError {
    fn from(err: &CorkboardError) -> Self {
        Self::coded(err.code(), err.to_string())
    }
}

/// Board errors keep their code and hint wherever they sit in the chain;
/// anything else is reported with its full context.
impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        if let Some(cli) = err.downcast_ref::<Self>() {
            return cli.clone();
        }
        if let Some(board) = err.downcast_ref::<CorkboardError>() {
            return board.into();
        }
        Self::plain(format!("{err:#}"))
    }
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    error: &'a CliError,
}

/// Write `error` to `w` in the form `mode` asks for.
pub fn emit_error(w: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    if mode.is_json() {
        return write_json(w, &ErrorEnvelope { error });
    }
    match &error.error_code {
        Some(code) => writeln!(w, "error[{code}]: {}", error.message)?,
        None => writeln!(w, "error: {}", error.message)?,
    }
    if let Some(suggestion) = &error.suggestion {
        writeln!(w, "  hint: {suggestion}")?;
    }
    Ok(())
}

pub fn print_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    emit_error(&mut io::stderr().lock(), mode, error)
}
