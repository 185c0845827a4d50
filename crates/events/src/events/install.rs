use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::FailureContext;

/// Install session events - one attempt is one `install_apk_files` call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InstallEvent {
    /// Attempt started
    Started {
        attempt_id: Uuid,
        installer: String,
        /// Package source implementation in use
        source: String,
    },

    /// One session-creation candidate failed or printed no session id
    SessionCandidateFailed {
        attempt_id: Uuid,
        /// 1-based position in the command ladder
        candidate: usize,
        command: String,
        result: String,
    },

    /// Session created
    SessionCreated {
        attempt_id: Uuid,
        session_id: i32,
        command: String,
    },

    /// Payload write about to be issued
    PayloadWriting {
        attempt_id: Uuid,
        index: usize,
        name: String,
        bytes: u64,
    },

    /// Payload accepted by the session
    PayloadWritten { attempt_id: Uuid, index: usize },

    /// Commit accepted, waiting for the package-added notification
    AwaitingCompletion { attempt_id: Uuid, session_id: i32 },

    /// Failed attempt's session was abandoned
    SessionAbandoned {
        attempt_id: Uuid,
        session_id: i32,
        success: bool,
    },

    /// A package-added notification arrived but did not resolve the attempt
    NotificationIgnored { package: String, reason: String },

    /// Installation completed successfully
    Succeeded {
        attempt_id: Option<Uuid>,
        package: String,
    },

    /// Installation failed
    Failed {
        attempt_id: Uuid,
        failure: FailureContext,
        /// Full diagnostic text meant for direct display
        diagnostic: String,
    },
}

impl InstallEvent {
    /// Attempt this event belongs to, when known
    #[must_use]
    pub fn attempt_id(&self) -> Option<Uuid> {
        match self {
            Self::Started { attempt_id, .. }
            | Self::SessionCandidateFailed { attempt_id, .. }
            | Self::SessionCreated { attempt_id, .. }
            | Self::PayloadWriting { attempt_id, .. }
            | Self::PayloadWritten { attempt_id, .. }
            | Self::AwaitingCompletion { attempt_id, .. }
            | Self::SessionAbandoned { attempt_id, .. }
            | Self::Failed { attempt_id, .. } => Some(*attempt_id),
            Self::Succeeded { attempt_id, .. } => *attempt_id,
            Self::NotificationIgnored { .. } => None,
        }
    }

    /// Whether this event is a terminal outcome
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Failed { .. })
    }
}
