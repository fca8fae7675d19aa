//! CLI command implementations.
//!
//! Each submodule implements a specific CLI command:
//! - [`usage`] - Usage key ranges, window plans and export

pub mod usage;

pub use usage::UsageCommand;
