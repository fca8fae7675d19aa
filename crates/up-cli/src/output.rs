//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output formats.

use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use up_usage::{ExportSummary, UsageWindow};

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter that handles both table and JSON output.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => {
                value.write_table(writer)?;
            }
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;
}

/// Key range covering a whole time range.
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    /// Account queried.
    pub account: String,
    /// Hour-aligned start of the range.
    pub start: DateTime<Utc>,
    /// Hour-aligned end of the range.
    pub end: DateTime<Utc>,
    /// Inclusive lower key bound.
    pub start_offset: String,
    /// Exclusive upper key bound.
    pub end_offset: String,
}

impl TableDisplay for QueryOutput {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Usage Query: {}", self.account)?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Start:         {}", rfc3339(self.start))?;
        writeln!(writer, "End:           {}", rfc3339(self.end))?;
        writeln!(writer)?;
        writeln!(writer, "Start Offset:  {}", self.start_offset)?;
        writeln!(writer, "End Offset:    {}", self.end_offset)?;
        Ok(())
    }
}

/// One window of a plan.
#[derive(Debug, Clone, Serialize)]
pub struct WindowRow {
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
    /// Inclusive lower key bound.
    pub start_offset: String,
    /// Exclusive upper key bound.
    pub end_offset: String,
}

impl From<UsageWindow> for WindowRow {
    fn from(w: UsageWindow) -> Self {
        Self {
            start: w.start,
            end: w.end,
            start_offset: w.query.start_offset,
            end_offset: w.query.end_offset,
        }
    }
}

/// Windows a time range is split into.
#[derive(Debug, Clone, Serialize)]
pub struct WindowPlan {
    /// Account queried.
    pub account: String,
    /// Window size in whole hours.
    pub window_hours: i64,
    /// Windows in order.
    pub windows: Vec<WindowRow>,
}

impl TableDisplay for WindowPlan {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.windows.is_empty() {
            writeln!(writer, "No windows in range")?;
            return Ok(());
        }

        writeln!(
            writer,
            "{:<20}  {:<20}  {:<44}  {:<44}",
            "START", "END", "START OFFSET", "END OFFSET"
        )?;
        writeln!(writer, "{}", "─".repeat(134))?;

        for w in &self.windows {
            writeln!(
                writer,
                "{:<20}  {:<20}  {:<44}  {:<44}",
                rfc3339(w.start),
                rfc3339(w.end),
                w.start_offset,
                w.end_offset
            )?;
        }

        writeln!(writer)?;
        writeln!(
            writer,
            "Total: {} window(s) of {}h for {}",
            self.windows.len(),
            self.window_hours,
            self.account
        )?;
        Ok(())
    }
}

/// Result of an export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    /// File the events were written to.
    pub output: String,
    /// Windows queried.
    pub windows: usize,
    /// Objects read.
    pub objects: usize,
    /// Events written.
    pub events: usize,
}

impl ExportReport {
    /// Builds a report from an export summary.
    #[must_use]
    pub fn new(output: impl Into<String>, summary: ExportSummary) -> Self {
        Self {
            output: output.into(),
            windows: summary.windows,
            objects: summary.objects,
            events: summary.events,
        }
    }
}

impl TableDisplay for ExportReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "✓ Exported usage to {}", self.output)?;
        writeln!(writer, "  Windows:  {}", self.windows)?;
        writeln!(writer, "  Objects:  {}", self.objects)?;
        writeln!(writer, "  Events:   {}", self.events)?;
        Ok(())
    }
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}
