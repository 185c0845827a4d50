//! Shell execution errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Errors raised when a command could not be run at all.
///
/// A command that runs and exits non-zero is not an error at this level;
/// callers inspect the exit code of the returned result instead.
#[derive(Debug, Clone, Error)]
pub enum ShellError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("input stream failed for {command}: {message}")]
    StreamFailed { command: String, message: String },

    #[error("command failed: {command}\n{output}")]
    CommandFailed { command: String, output: String },

    #[error("shell backend not found: {program}")]
    BackendNotFound { program: String },
}

impl UserFacingError for ShellError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::BackendNotFound { .. } => {
                Some("Install the shell backend (su or adb) or point the config at it.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::StreamFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ProcessExecutionFailed { .. } => "shell.process_execution_failed",
            Self::StreamFailed { .. } => "shell.stream_failed",
            Self::CommandFailed { .. } => "shell.command_failed",
            Self::BackendNotFound { .. } => "shell.backend_not_found",
        };
        Some(code)
    }
}
