//! Installation outcomes and the shared completion state
//!
//! Every `install_apk_files` call yields exactly one [`InstallationOutcome`].
//! Failures are resolved by the installer flow itself; success is resolved
//! later by the correlator. Both race through [`CompletionState`], where the
//! first completer takes the one-shot sender and any later one finds the
//! slot empty.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use sai_errors::InstallError;
use tokio::sync::oneshot;
use tracing::{debug, warn};
use uuid::Uuid;

/// Why an attempt failed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    ShellUnavailable,
    SessionCreationFailed,
    UnknownPayloadSize,
    WriteFailed,
    CommitFailed,
    UnexpectedFailure,
}

impl From<&InstallError> for FailureKind {
    fn from(error: &InstallError) -> Self {
        match error {
            InstallError::ShellUnavailable { .. } => Self::ShellUnavailable,
            InstallError::SessionCreationFailed { .. } => Self::SessionCreationFailed,
            InstallError::UnknownPayloadSize { .. } => Self::UnknownPayloadSize,
            InstallError::WriteFailed { .. } => Self::WriteFailed,
            InstallError::CommitFailed { .. } => Self::CommitFailed,
            InstallError::Unexpected { .. } => Self::UnexpectedFailure,
        }
    }
}

/// Terminal result of one install attempt
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstallationOutcome {
    Succeeded { package: String },
    Failed { kind: FailureKind, diagnostic: String },
}

impl InstallationOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Handle to the outcome of one attempt
///
/// Resolves with `None` only when the attempt can no longer complete: the
/// installer was dropped or a newer attempt replaced this one.
#[derive(Debug)]
pub struct PendingInstall {
    attempt_id: Uuid,
    receiver: oneshot::Receiver<InstallationOutcome>,
}

impl PendingInstall {
    #[must_use]
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Wait for the outcome
    pub async fn outcome(self) -> Option<InstallationOutcome> {
        self.receiver.await.ok()
    }

    /// Outcome if already resolved, without waiting
    pub fn try_outcome(&mut self) -> Option<InstallationOutcome> {
        self.receiver.try_recv().ok()
    }
}

struct ActiveAttempt {
    id: Uuid,
    sender: oneshot::Sender<InstallationOutcome>,
}

/// Awaiting flag plus the completion slot of the current attempt
#[derive(Default)]
pub(crate) struct CompletionState {
    awaiting: AtomicBool,
    active: Mutex<Option<ActiveAttempt>>,
}

impl CompletionState {
    fn slot(&self) -> MutexGuard<'_, Option<ActiveAttempt>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open the completion slot for a new attempt
    pub(crate) fn begin(&self, id: Uuid) -> PendingInstall {
        let (sender, receiver) = oneshot::channel();
        let previous = self.slot().replace(ActiveAttempt { id, sender });
        if let Some(previous) = previous {
            warn!(
                previous = %previous.id,
                current = %id,
                awaiting = self.is_awaiting(),
                "install started while another attempt is unresolved; the previous attempt will not complete"
            );
        }
        self.disarm();
        PendingInstall {
            attempt_id: id,
            receiver,
        }
    }

    pub(crate) fn is_awaiting(&self) -> bool {
        self.awaiting.load(Ordering::SeqCst)
    }

    pub(crate) fn arm(&self) {
        self.awaiting.store(true, Ordering::SeqCst);
    }

    pub(crate) fn disarm(&self) {
        self.awaiting.store(false, Ordering::SeqCst);
    }

    /// Atomically flip awaiting true -> false; only one caller wins
    pub(crate) fn claim(&self) -> bool {
        self.awaiting
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Resolve `attempt` if its slot is still open
    pub(crate) fn resolve_attempt(&self, attempt: Uuid, outcome: InstallationOutcome) -> bool {
        let taken = {
            let mut slot = self.slot();
            match slot.as_ref() {
                Some(active) if active.id == attempt => slot.take(),
                _ => None,
            }
        };
        match taken {
            Some(active) => {
                deliver(active, outcome);
                true
            }
            None => {
                warn!(attempt = %attempt, ?outcome, "attempt already resolved; dropping outcome");
                false
            }
        }
    }

    /// Resolve whichever attempt is current, returning its id
    pub(crate) fn resolve_current(&self, outcome: InstallationOutcome) -> Option<Uuid> {
        let taken = self.slot().take();
        match taken {
            Some(active) => {
                let id = active.id;
                deliver(active, outcome);
                Some(id)
            }
            None => {
                warn!(?outcome, "no attempt awaiting an outcome; dropping it");
                None
            }
        }
    }
}

fn deliver(active: ActiveAttempt, outcome: InstallationOutcome) {
    if active.sender.send(outcome).is_err() {
        // The caller dropped its handle; the outcome still counts as reported.
        debug!(attempt = %active.id, "outcome receiver dropped");
    }
}
