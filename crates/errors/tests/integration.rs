//! Integration tests for error types

#[cfg(test)]
mod tests {
    use sai_errors::*;

    #[test]
    fn test_error_conversion() {
        let shell_err = ShellError::BackendNotFound {
            program: "adb".into(),
        };
        let err: Error = shell_err.into();
        assert!(matches!(err, Error::Shell(_)));
        assert_eq!(err.user_code(), Some("shell.backend_not_found"));
    }

    #[test]
    fn test_session_transcript_is_verbatim() {
        let transcript = "Unable to create session, attempted commands: \n\n1) ===\npm\n";
        let err = InstallError::SessionCreationFailed {
            transcript: transcript.into(),
        };
        assert_eq!(err.to_string(), transcript);
    }

    #[test]
    fn test_error_clone() {
        let err = InstallError::CommitFailed {
            result: "Failure [INSTALL_FAILED_VERSION_DOWNGRADE]".into(),
        };
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::BrokenPipe,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_io_error_reports_stable_code() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file").into();
        assert_eq!(err.user_code(), Some("error.io"));
        assert_eq!(err.user_message(), "no such file");
        assert_eq!(err.user_hint(), None);
    }
}
