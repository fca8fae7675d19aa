//! CLI error types.

use std::fmt;

use up_usage::UsageError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// Usage query or export failed.
    Usage(UsageError),
    /// Command execution failed.
    Command(String),
    /// Output formatting error.
    Format(String),
    /// Invalid argument.
    InvalidArgument(String),
    /// IO error.
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usage(e) => write!(f, "{e}"),
            Self::Command(msg) => write!(f, "command error: {msg}"),
            Self::Format(msg) => write!(f, "format error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Usage(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<UsageError> for CliError {
    fn from(err: UsageError) -> Self {
        Self::Usage(err)
    }
}
