//! CLI error handling

use std::fmt;

use sai_errors::UserFacingError;
use sai_install::FailureKind;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(sai_errors::ConfigError),
    /// Error from one of the library crates
    Ops(sai_errors::Error),
    /// The install attempt resolved to a failure
    InstallFailed {
        kind: FailureKind,
        diagnostic: String,
    },
    /// No package notification arrived in time
    Timeout { seconds: u64 },
    /// The attempt can no longer complete
    Abandoned,
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Ops(e) => {
                let message = e.user_message();
                write!(f, "{message}")?;
                if let Some(code) = e.user_code() {
                    write!(f, "\n  Code: {code}")?;
                }
                if let Some(hint) = e.user_hint() {
                    write!(f, "\n  Hint: {hint}")?;
                }
                if e.is_retryable() {
                    write!(f, "\n  Retry: safe to retry this operation.")?;
                }
                Ok(())
            }
            CliError::InstallFailed { diagnostic, .. } => write!(f, "{diagnostic}"),
            CliError::Timeout { seconds } => write!(
                f,
                "No installed-package notification within {seconds}s; the package manager may still finish the install"
            ),
            CliError::Abandoned => write!(f, "Install attempt ended without an outcome"),
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<sai_errors::ConfigError> for CliError {
    fn from(e: sai_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<sai_errors::Error> for CliError {
    fn from(e: sai_errors::Error) -> Self {
        CliError::Ops(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
