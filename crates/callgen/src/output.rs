//! Line and summary presentation.

use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use callgen_core::GeneratorError;

/// How a run ended, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The file was read to the end.
    Completed,
    /// `--limit` lines were printed and the run was stopped.
    LimitReached,
    /// The run was cancelled (Ctrl+C).
    Cancelled,
    /// A callback failed or the handoff timed out.
    Failed,
}

/// Summary printed after the lines.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub path: String,
    pub run_id: u64,
    pub status: Status,
    pub lines_read: u64,
    pub lines_printed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Summary {
    /// Build a summary from the outcome of a run.
    #[must_use]
    pub fn new(
        path: &Path,
        run_id: u64,
        lines_read: u64,
        lines_printed: u64,
        status: Status,
        error: Option<&GeneratorError<io::Error>>,
    ) -> Self {
        Self {
            path: path.display().to_string(),
            run_id,
            status,
            lines_read,
            lines_printed,
            error: error.map(ToString::to_string),
        }
    }
}

/// Writes lines and the final summary.
pub struct Presenter {
    number: bool,
    quiet: bool,
    json: bool,
}

impl Presenter {
    #[must_use]
    pub fn new(number: bool, quiet: bool, json: bool) -> Self {
        Self {
            number,
            quiet,
            json,
        }
    }

    /// Print one line, unless quiet.
    pub fn line(&self, out: &mut dyn Write, line_no: u64, line: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        if self.number {
            writeln!(out, "{line_no:>6}: {line}")
        } else {
            writeln!(out, "{line}")
        }
    }

    /// Print the summary as text or JSON.
    pub fn summary(&self, out: &mut dyn Write, summary: &Summary) -> io::Result<()> {
        if self.json {
            serde_json::to_writer(&mut *out, summary)?;
            return writeln!(out);
        }
        writeln!(out, "---")?;
        writeln!(out, "path: {}", summary.path)?;
        writeln!(out, "status: {:?}", summary.status)?;
        writeln!(out, "lines read: {}", summary.lines_read)?;
        writeln!(out, "lines printed: {}", summary.lines_printed)?;
        if let Some(error) = &summary.error {
            writeln!(out, "error: {error}")?;
        }
        Ok(())
    }
}
