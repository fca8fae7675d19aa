//! # up-cli
//!
//! Command-line interface for managed control plane usage.
//!
//! Provides commands for:
//! - Computing the partition key range covering a time range
//! - Planning how a long range is split into bounded query windows
//! - Exporting stored usage events as a single JSON array
//!
//! # Architecture
//!
//! The CLI is a thin layer over `up-usage`. Exports read from an
//! hour-partitioned directory and stream events into the output file one
//! window at a time.
//!
//! ```text
//! ┌──────────┐   windows    ┌───────────┐   events   ┌──────────────┐
//! │  up-cli  │─────────────►│  store    │───────────►│  usage.json  │
//! └──────────┘              └───────────┘            └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Commands, Format, UsageCommands};
pub use error::CliError;
pub use output::OutputFormat;
