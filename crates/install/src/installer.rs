//! Session installer
//!
//! One attempt: create a session, stream every payload into it, commit.
//! Failures are reported right away; an accepted commit is left for the
//! correlator to resolve once the system announces the installed package.

use std::sync::Arc;

use sai_errors::{Error, InstallError};
use sai_events::{AppEvent, EventEmitter, EventSender, FailureContext, InstallEvent};
use sai_source::{PackageSource, PayloadLength};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::backend::InstallerBackend;
use crate::commands;
use crate::correlator::{CompletionCorrelator, NotificationFilter, SystemNotification};
use crate::environment::{source_tag, DeviceInfo};
use crate::ladder::{SessionId, SessionLadder};
use crate::outcome::{CompletionState, FailureKind, InstallationOutcome, PendingInstall};
use crate::query::InstallerQuery;

/// Package id the shell user installs as when nothing else is configured
pub const DEFAULT_INSTALLER_ID: &str = "com.android.shell";

/// Installer configuration
#[derive(Clone, Debug)]
pub struct InstallConfig {
    /// Installer identity passed to `pm install-create -i` and expected back
    /// from the installer-of-record lookup
    pub installer_id: String,
    /// Leading label of the environment summary
    pub device_label: String,
    pub device: DeviceInfo,
    /// Issue `pm install-abandon` when an attempt fails with a session open
    pub abandon_on_failure: bool,
    /// Trailing tag of the environment summary
    pub app_version: String,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            installer_id: DEFAULT_INSTALLER_ID.to_string(),
            device_label: "Device".to_string(),
            device: DeviceInfo::unknown(),
            abandon_on_failure: true,
            app_version: concat!("sai ", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl InstallConfig {
    #[must_use]
    pub fn with_installer_id(mut self, installer_id: impl Into<String>) -> Self {
        self.installer_id = installer_id.into();
        self
    }

    #[must_use]
    pub fn with_device_label(mut self, label: impl Into<String>) -> Self {
        self.device_label = label.into();
        self
    }

    #[must_use]
    pub fn with_device(mut self, device: DeviceInfo) -> Self {
        self.device = device;
        self
    }

    #[must_use]
    pub fn with_abandon_on_failure(mut self, abandon: bool) -> Self {
        self.abandon_on_failure = abandon;
        self
    }

    #[must_use]
    pub fn with_app_version(mut self, version: impl Into<String>) -> Self {
        self.app_version = version.into();
        self
    }
}

/// A failed attempt, with the session it left behind if any
struct AttemptFailure {
    error: InstallError,
    session: Option<SessionId>,
}

impl AttemptFailure {
    fn before_session(error: impl Into<Error>) -> Self {
        Self {
            error: classify(error.into()),
            session: None,
        }
    }

    fn in_session(session: SessionId) -> impl FnOnce(Error) -> Self {
        move |error| Self {
            error: classify(error),
            session: Some(session),
        }
    }
}

/// Anything that is not already an install failure is unexpected
fn classify(error: Error) -> InstallError {
    match error {
        Error::Install(error) => error,
        other => InstallError::Unexpected {
            message: other.to_string(),
        },
    }
}

/// Installs packages through `pm` install sessions over a shell
///
/// Not reentrant: only one attempt may be outstanding per instance, since
/// package notifications carry no session to tell attempts apart.
pub struct ShellPackageInstaller {
    backend: Box<dyn InstallerBackend>,
    config: InstallConfig,
    ladder: SessionLadder,
    state: Arc<CompletionState>,
    correlator: CompletionCorrelator,
    listener: JoinHandle<()>,
    events: Option<EventSender>,
}

impl std::fmt::Debug for ShellPackageInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellPackageInstaller")
            .field("installer", &self.backend.installer_name())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ShellPackageInstaller {
    /// Create an installer and start listening for package notifications.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(
        backend: Box<dyn InstallerBackend>,
        config: InstallConfig,
        query: Arc<dyn InstallerQuery>,
        notifications: broadcast::Receiver<SystemNotification>,
        events: Option<EventSender>,
    ) -> Self {
        let state = Arc::new(CompletionState::default());
        let correlator = CompletionCorrelator::new(
            Arc::clone(&state),
            config.installer_id.clone(),
            query,
            events.clone(),
        );
        let listener = correlator
            .clone()
            .spawn(NotificationFilter::package_added(), notifications);

        Self {
            ladder: SessionLadder::for_installer(&config.installer_id),
            backend,
            config,
            state,
            correlator,
            listener,
            events,
        }
    }

    #[must_use]
    pub fn config(&self) -> &InstallConfig {
        &self.config
    }

    /// Whether a committed session is waiting for its notification
    #[must_use]
    pub fn is_awaiting(&self) -> bool {
        self.state.is_awaiting()
    }

    /// Handle for feeding notifications directly
    #[must_use]
    pub fn correlator(&self) -> &CompletionCorrelator {
        &self.correlator
    }

    /// Install every payload of `source` as one package.
    ///
    /// The returned handle resolves exactly once. The source is closed before
    /// this returns, whatever happened.
    pub async fn install_apk_files<S: PackageSource>(&self, mut source: S) -> PendingInstall {
        let attempt_id = Uuid::new_v4();
        let pending = self.state.begin(attempt_id);
        let source_name = source.implementation_name().to_string();

        info!(attempt = %attempt_id, installer = self.backend.installer_name(), source = %source_name, "install started");
        self.events.emit(AppEvent::Install(InstallEvent::Started {
            attempt_id,
            installer: self.backend.installer_name().to_string(),
            source: source_name.clone(),
        }));

        match self.run_attempt(attempt_id, &mut source).await {
            Ok(session) => {
                debug!(attempt = %attempt_id, %session, "commit accepted; awaiting notification");
            }
            Err(failure) => {
                if let Some(session) = failure.session {
                    self.abandon(attempt_id, session, &failure.error).await;
                }
                self.fail(attempt_id, &source_name, &failure.error);
            }
        }

        if let Err(e) = source.close().await {
            warn!(attempt = %attempt_id, error = %e, "failed to close package source");
            self.events
                .emit_warning_with_context("Failed to close package source", e.to_string());
        }

        pending
    }

    async fn run_attempt<S: PackageSource>(
        &self,
        attempt_id: Uuid,
        source: &mut S,
    ) -> Result<SessionId, AttemptFailure> {
        let shell = self.backend.shell();

        if !shell.is_available().await {
            return Err(AttemptFailure::before_session(InstallError::ShellUnavailable {
                installer: self.backend.installer_name().to_string(),
                reason: self.backend.shell_unavailable_message().await,
            }));
        }

        let session = self
            .ladder
            .create_session(shell, attempt_id, &self.events)
            .await
            .map_err(AttemptFailure::before_session)?;

        self.write_payloads(attempt_id, session, source)
            .await
            .map_err(AttemptFailure::in_session(session))?;

        self.state.arm();
        let result = shell
            .exec(&commands::commit(session), None)
            .await
            .map_err(|e| AttemptFailure {
                error: classify(e),
                // The session may or may not be finalized; leave it alone.
                session: None,
            })?;

        if !result.is_successful() {
            self.state.disarm();
            return Err(AttemptFailure {
                error: InstallError::CommitFailed {
                    result: result.to_string(),
                },
                session: None,
            });
        }

        self.events
            .emit(AppEvent::Install(InstallEvent::AwaitingCompletion {
                attempt_id,
                session_id: session.get(),
            }));
        Ok(session)
    }

    async fn write_payloads<S: PackageSource>(
        &self,
        attempt_id: Uuid,
        session: SessionId,
        source: &mut S,
    ) -> Result<(), Error> {
        let shell = self.backend.shell();
        let mut index = 0usize;

        while source.next_payload().await? {
            let name = source.payload_name().unwrap_or("<unnamed>").to_string();
            let PayloadLength::Known(bytes) = source.payload_length() else {
                return Err(InstallError::UnknownPayloadSize { index, name }.into());
            };

            self.events.emit(AppEvent::Install(InstallEvent::PayloadWriting {
                attempt_id,
                index,
                name: name.clone(),
                bytes,
            }));

            let stream = source.open_payload().await?;
            let result = shell
                .exec(&commands::write_payload(bytes, session, index), Some(stream))
                .await?;
            if !result.is_successful() {
                return Err(InstallError::WriteFailed {
                    index,
                    result: result.to_string(),
                }
                .into());
            }

            debug!(attempt = %attempt_id, index, name = %name, bytes, "payload written");
            self.events
                .emit(AppEvent::Install(InstallEvent::PayloadWritten { attempt_id, index }));
            index += 1;
        }

        Ok(())
    }

    /// Best-effort cleanup of a session a failed attempt left open
    async fn abandon(&self, attempt_id: Uuid, session: SessionId, cause: &InstallError) {
        if !self.config.abandon_on_failure {
            return;
        }

        let success = match self
            .backend
            .shell()
            .exec(&commands::abandon(session), None)
            .await
        {
            Ok(result) if result.is_successful() => true,
            Ok(result) => {
                warn!(%session, result = %result, "failed to abandon session");
                false
            }
            Err(e) => {
                warn!(%session, error = %e, "failed to abandon session");
                false
            }
        };
        debug!(%session, cause = %cause, success, "session abandoned");
        self.events
            .emit(AppEvent::Install(InstallEvent::SessionAbandoned {
                attempt_id,
                session_id: session.get(),
                success,
            }));
    }

    fn fail(&self, attempt_id: Uuid, source_name: &str, error: &InstallError) {
        self.state.disarm();

        let diagnostic = self.diagnostic(source_name, error);
        let outcome = InstallationOutcome::Failed {
            kind: FailureKind::from(error),
            diagnostic: diagnostic.clone(),
        };

        if self.state.resolve_attempt(attempt_id, outcome) {
            error!(attempt = %attempt_id, error = %error, "installation failed");
            self.events.emit(AppEvent::Install(InstallEvent::Failed {
                attempt_id,
                failure: FailureContext::from_error(error),
                diagnostic,
            }));
        }
    }

    fn diagnostic(&self, source_name: &str, error: &InstallError) -> String {
        let installer = self.backend.installer_name();
        match error {
            InstallError::ShellUnavailable { reason, .. } => {
                format!("Installation via {installer} failed: {reason}")
            }
            other => {
                let environment = self.config.device.summary(
                    &self.config.device_label,
                    &source_tag(source_name, &self.config.app_version),
                );
                format!("Installation via {installer} failed: {environment}\n\n{other}")
            }
        }
    }
}

impl Drop for ShellPackageInstaller {
    fn drop(&mut self) {
        self.listener.abort();
    }
}
