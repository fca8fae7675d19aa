//! Usage command implementation.
//!
//! Provides subcommands for:
//! - Showing the key range covering a time range
//! - Planning the windows a time range is split into
//! - Exporting stored usage events to a JSON file

use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};
use up_usage::{
    export_usage, truncate_to_hour, usage_query, ExportSummary, FileUsageStore,
    JsonArrayEncoder, UsageQueryIterator,
};

use crate::cli::{ExportArgs, PlanArgs, RangeArgs, UsageCommands};
use crate::error::CliError;
use crate::output::{ExportReport, OutputFormat, QueryOutput, WindowPlan, WindowRow};

/// Usage command executor.
#[derive(Debug, Default)]
pub struct UsageCommand;

impl UsageCommand {
    /// Create a new usage command.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Execute a usage subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is invalid or the export fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &UsageCommands,
    ) -> Result<(), CliError> {
        match command {
            UsageCommands::Query(args) => {
                let output = self.query(args)?;
                format.write(writer, &output)?;
            }
            UsageCommands::Plan(args) => {
                let plan = self.plan(args)?;
                format.write(writer, &plan)?;
            }
            UsageCommands::Export(args) => {
                let report = self.export(args).await?;
                format.write(writer, &report)?;
            }
        }
        Ok(())
    }

    /// Compute the single key range covering the requested time range.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is empty or the range is reversed.
    pub fn query(&self, args: &RangeArgs) -> Result<QueryOutput, CliError> {
        validate_account(&args.account)?;
        let query = usage_query(&args.account, args.start, args.end)?;
        Ok(QueryOutput {
            account: args.account.clone(),
            start: truncate_to_hour(args.start),
            end: truncate_to_hour(args.end),
            start_offset: query.start_offset,
            end_offset: query.end_offset,
        })
    }

    /// List every window the requested time range is split into.
    ///
    /// # Errors
    ///
    /// Returns an error if the account is empty, the window is shorter than
    /// an hour, or the range is reversed.
    pub fn plan(&self, args: &PlanArgs) -> Result<WindowPlan, CliError> {
        let mut iter = windows(&args.range, args.window)?;
        let window_hours = iter.window().num_hours();
        let mut rows = Vec::with_capacity(iter.remaining());
        while iter.more() {
            rows.push(WindowRow::from(iter.advance()?));
        }
        Ok(WindowPlan {
            account: args.range.account.clone(),
            window_hours,
            windows: rows,
        })
    }

    /// Export every event in the requested range from a file store.
    ///
    /// Runs on the blocking pool. Events are written to a temporary file next
    /// to the output, which is renamed into place only once the array is
    /// complete. A failed export leaves any existing output untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments are invalid, the store cannot be
    /// read, or the output cannot be written.
    pub async fn export(&self, args: &ExportArgs) -> Result<ExportReport, CliError> {
        let iter = windows(&args.range, args.window)?;
        let store = args.store.clone();
        let output = args.output.clone();

        let summary = tokio::task::spawn_blocking(move || export_to_file(&store, &output, iter))
            .await
            .map_err(|e| CliError::Command(format!("export task failed: {e}")))??;

        info!(
            output = %args.output.display(),
            windows = summary.windows,
            events = summary.events,
            "usage export complete"
        );
        Ok(ExportReport::new(args.output.display().to_string(), summary))
    }
}

fn validate_account(account: &str) -> Result<(), CliError> {
    if account.trim().is_empty() {
        return Err(CliError::InvalidArgument("account cannot be empty".into()));
    }
    Ok(())
}

fn windows(range: &RangeArgs, window: chrono::TimeDelta) -> Result<UsageQueryIterator, CliError> {
    validate_account(&range.account)?;
    Ok(UsageQueryIterator::new(
        range.account.as_str(),
        range.start,
        range.end,
        window,
    )?)
}

fn export_to_file(
    store: &Path,
    output: &Path,
    windows: UsageQueryIterator,
) -> Result<ExportSummary, CliError> {
    let store = FileUsageStore::with_root(store)?;
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    // Dropped (and deleted) on any early return.
    let mut staged = NamedTempFile::new_in(dir)?;
    debug!(path = %staged.path().display(), "staging usage export");

    let summary = write_array(&store, BufWriter::new(&mut staged), windows)?;
    staged.persist(output).map_err(|e| CliError::Io(e.error))?;
    Ok(summary)
}

fn write_array<W: Write>(
    store: &FileUsageStore,
    sink: W,
    windows: UsageQueryIterator,
) -> Result<ExportSummary, CliError> {
    let mut encoder = JsonArrayEncoder::new(sink)?;
    let summary = export_usage(store, windows, &mut encoder)?;
    encoder.close()?;
    Ok(summary)
}
