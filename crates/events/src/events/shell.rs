//! Shell command execution events

use serde::{Deserialize, Serialize};

/// Events describing individual commands sent to the shell backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ShellEvent {
    /// Availability probe finished
    AvailabilityChecked {
        /// Backend name (`su`, `adb`, ...)
        backend: String,
        available: bool,
        /// Why the backend cannot be used, when it cannot
        reason: Option<String>,
    },

    /// Command handed to the backend
    CommandStarted {
        backend: String,
        command: String,
        /// Whether a payload stream is piped into stdin
        with_input: bool,
    },

    /// Command ran to completion (any exit code)
    CommandCompleted {
        command: String,
        exit_code: i32,
        /// Duration of execution in milliseconds
        duration_ms: u64,
        stdout_bytes: usize,
        stderr_bytes: usize,
    },

    /// Command could not be run at all
    CommandFailed {
        command: String,
        error_message: String,
        /// Duration before failure in milliseconds
        duration_ms: u64,
    },
}
