//! Package source errors

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("package file not found: {path}")]
    NotFound { path: String },

    #[error("failed to open payload {name}: {message}")]
    OpenFailed { name: String, message: String },

    #[error("no payload selected")]
    NoPayloadSelected,

    #[error("payload {name} was already opened")]
    AlreadyOpened { name: String },

    #[error("failed to read source directory {path}: {message}")]
    DirectoryReadFailed { path: String, message: String },

    #[error("failed to release package source: {message}")]
    CloseFailed { message: String },
}

impl UserFacingError for SourceError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } | Self::DirectoryReadFailed { .. } => {
                Some("Check the package path and its permissions.")
            }
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "source.not_found",
            Self::OpenFailed { .. } => "source.open_failed",
            Self::NoPayloadSelected => "source.no_payload_selected",
            Self::AlreadyOpened { .. } => "source.already_opened",
            Self::DirectoryReadFailed { .. } => "source.directory_read_failed",
            Self::CloseFailed { .. } => "source.close_failed",
        };
        Some(code)
    }
}
