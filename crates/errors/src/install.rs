//! Installation session error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

/// Failures of a single `pm` install session attempt.
///
/// `SessionCreationFailed`, `WriteFailed` and `CommitFailed` carry the full
/// shell transcript so it can be shown to the user unabridged.
#[derive(Debug, Clone, Error)]
pub enum InstallError {
    #[error("{installer} cannot run commands: {reason}")]
    ShellUnavailable { installer: String, reason: String },

    #[error("{transcript}")]
    SessionCreationFailed { transcript: String },

    #[error("unknown payload size: {name} (payload #{index})")]
    UnknownPayloadSize { index: usize, name: String },

    #[error("failed to write payload {index}.apk:\n{result}")]
    WriteFailed { index: usize, result: String },

    #[error("commit rejected:\n{result}")]
    CommitFailed { result: String },

    #[error("unexpected failure: {message}")]
    Unexpected { message: String },
}

impl UserFacingError for InstallError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::ShellUnavailable { .. } => {
                Some("Grant root access or connect a device with USB debugging enabled.")
            }
            Self::SessionCreationFailed { .. } => {
                Some("Check that the device's package manager accepts install sessions.")
            }
            Self::UnknownPayloadSize { .. } => {
                Some("Make sure every package file is readable and fully downloaded.")
            }
            Self::CommitFailed { .. } => {
                Some("Inspect the commit output; signature or version conflicts are common causes.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::ShellUnavailable { .. } | Self::Unexpected { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::ShellUnavailable { .. } => "install.shell_unavailable",
            Self::SessionCreationFailed { .. } => "install.session_creation_failed",
            Self::UnknownPayloadSize { .. } => "install.unknown_payload_size",
            Self::WriteFailed { .. } => "install.write_failed",
            Self::CommitFailed { .. } => "install.commit_failed",
            Self::Unexpected { .. } => "install.unexpected",
        };
        Some(code)
    }
}
