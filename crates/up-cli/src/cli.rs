//! Command-line argument parsing with clap.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Managed control plane CLI.
#[derive(Parser, Debug, Clone)]
#[command(name = "up")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[derive(Default)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Query and export control plane usage.
    Usage {
        /// Usage subcommand to execute.
        #[command(subcommand)]
        command: UsageCommands,
    },
}

/// Usage subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum UsageCommands {
    /// Show the partition key range covering a time range.
    Query(RangeArgs),

    /// Show how a time range is split into query windows.
    Plan(PlanArgs),

    /// Export usage events from a partitioned store as a JSON array.
    Export(ExportArgs),
}

/// Account and time range shared by usage subcommands.
#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Organization account whose usage is queried.
    #[arg(short, long, env = "UP_ACCOUNT")]
    pub account: String,

    /// Start of the range (RFC 3339 or YYYY-MM-DD, UTC). Truncated to the hour.
    #[arg(long, value_parser = parse_time)]
    pub start: DateTime<Utc>,

    /// End of the range, exclusive (RFC 3339 or YYYY-MM-DD, UTC). Truncated to the hour.
    #[arg(long, value_parser = parse_time)]
    pub end: DateTime<Utc>,
}

/// Arguments for the plan command.
#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    /// Account and time range.
    #[command(flatten)]
    pub range: RangeArgs,

    /// Window size, e.g. `1h`, `24h` or `7d`. Truncated to whole hours.
    #[arg(short, long, value_parser = parse_window, default_value = "24h")]
    pub window: TimeDelta,
}

/// Arguments for the export command.
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Account and time range.
    #[command(flatten)]
    pub range: RangeArgs,

    /// Window size, e.g. `1h`, `24h` or `7d`. Truncated to whole hours.
    #[arg(short, long, value_parser = parse_window, default_value = "24h")]
    pub window: TimeDelta,

    /// Root directory of the hour-partitioned usage store.
    #[arg(short, long, env = "UP_USAGE_STORE")]
    pub store: PathBuf,

    /// File the JSON array is written to.
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Parses a window such as `90m`, `24h` or `30d`.
///
/// # Errors
///
/// Returns a message if the number or unit is missing or out of range.
pub fn parse_window(s: &str) -> Result<TimeDelta, String> {
    let s = s.trim();
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (digits, unit) = s.split_at(split);
    let invalid = || format!("invalid window '{s}': expected a number followed by m, h or d");

    let n: i64 = digits.parse().map_err(|_| invalid())?;
    match unit {
        "m" => TimeDelta::try_minutes(n),
        "h" => TimeDelta::try_hours(n),
        "d" => TimeDelta::try_days(n),
        _ => None,
    }
    .ok_or_else(invalid)
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date at midnight UTC.
///
/// # Errors
///
/// Returns a message if `s` matches neither form.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid time '{s}': expected RFC 3339 or YYYY-MM-DD"))
}
