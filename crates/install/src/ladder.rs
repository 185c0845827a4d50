//! Session creation through an ordered ladder of command variants
//!
//! Each candidate is tried in turn. A non-zero exit or output without a
//! session id moves on to the next one; the first id wins. When every
//! candidate fails, the error carries every command and its full transcript
//! so the user sees exactly what the device said.

use std::fmt::{self, Write as _};

use sai_errors::{Error, InstallError};
use sai_events::{AppEvent, EventEmitter, InstallEvent};
use sai_shell::{Shell, ShellCommand};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::commands;

/// Install session id handed out by the package manager
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SessionId(i32);

impl SessionId {
    #[must_use]
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the first maximal run of ASCII digits as an `i32`.
///
/// Returns `None` when there is no digit or the run overflows.
#[must_use]
pub fn extract_session_id(text: &str) -> Option<i32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Ordered session-creation candidates for one logical operation
#[derive(Clone, Debug)]
pub struct SessionLadder {
    candidates: Vec<ShellCommand>,
}

impl SessionLadder {
    #[must_use]
    pub fn new(candidates: Vec<ShellCommand>) -> Self {
        Self { candidates }
    }

    /// The standard `pm install-create` ladder for `installer_id`
    #[must_use]
    pub fn for_installer(installer_id: &str) -> Self {
        Self::new(commands::create_session_candidates(installer_id))
    }

    #[must_use]
    pub fn candidates(&self) -> &[ShellCommand] {
        &self.candidates
    }

    /// Run the candidates in order until one yields a session id.
    ///
    /// # Errors
    ///
    /// Returns `InstallError::SessionCreationFailed` with the full attempt
    /// transcript when every candidate fails, or the shell's error if a
    /// command could not be executed at all.
    pub async fn create_session(
        &self,
        shell: &dyn Shell,
        attempt_id: Uuid,
        events: &impl EventEmitter,
    ) -> Result<SessionId, Error> {
        let mut attempts: Vec<(&ShellCommand, String)> = Vec::with_capacity(self.candidates.len());

        for (position, command) in self.candidates.iter().enumerate() {
            let result = shell.exec(command, None).await?;
            let transcript = result.to_string();

            if result.is_successful() {
                if let Some(id) = extract_session_id(result.out()) {
                    debug!(session = id, command = %command, "session created");
                    events.emit(AppEvent::Install(InstallEvent::SessionCreated {
                        attempt_id,
                        session_id: id,
                        command: command.to_string(),
                    }));
                    return Ok(SessionId::new(id));
                }
            }

            warn!(command = %command, result = %transcript, "session candidate failed");
            events.emit(AppEvent::Install(InstallEvent::SessionCandidateFailed {
                attempt_id,
                candidate: position + 1,
                command: command.to_string(),
                result: transcript.clone(),
            }));
            attempts.push((command, transcript));
        }

        Err(InstallError::SessionCreationFailed {
            transcript: render_attempts(&attempts),
        }
        .into())
    }
}

fn render_attempts(attempts: &[(&ShellCommand, String)]) -> String {
    let mut text = String::from("Unable to create session, attempted commands: ");
    for (i, (command, result)) in attempts.iter().enumerate() {
        let _ = write!(
            text,
            "\n\n{}) ==========================\n{command}\nVVVVVVVVVVVVVVVV\n{result}",
            i + 1
        );
    }
    text.push('\n');
    text
}
