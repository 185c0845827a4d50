//! Package-added notifications and the completion correlator
//!
//! A committed session finishes asynchronously. The correlator listens for
//! package-added notifications and turns the first one attributable to this
//! installer into the attempt's success outcome.

use std::sync::Arc;

use sai_events::{AppEvent, EventEmitter, EventSender, InstallEvent};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::outcome::{CompletionState, InstallationOutcome};
use crate::query::InstallerQuery;

/// Broadcast action for a newly installed or replaced package
pub const ACTION_PACKAGE_ADDED: &str = "android.intent.action.PACKAGE_ADDED";

/// Data scheme of package notifications
pub const PACKAGE_SCHEME: &str = "package";

/// Package id reported when a notification carries no usable data
pub const UNKNOWN_PACKAGE: &str = "null";

/// A system-level broadcast as seen by the installer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SystemNotification {
    pub action: String,
    /// URI-like payload, e.g. `package:com.example.app`
    pub data: Option<String>,
}

impl SystemNotification {
    #[must_use]
    pub fn new(action: impl Into<String>, data: Option<String>) -> Self {
        Self {
            action: action.into(),
            data,
        }
    }

    /// Package-added notification for `package`
    #[must_use]
    pub fn package_added(package: &str) -> Self {
        Self::new(
            ACTION_PACKAGE_ADDED,
            Some(format!("{PACKAGE_SCHEME}:{package}")),
        )
    }

    /// Scheme part of the data, if any
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.data.as_deref()?.split_once(':').map(|(scheme, _)| scheme)
    }

    /// Package id carried by the data, or [`UNKNOWN_PACKAGE`]
    #[must_use]
    pub fn package(&self) -> String {
        let prefix = format!("{PACKAGE_SCHEME}:");
        match self.data.as_deref() {
            Some(data) => data.strip_prefix(&prefix).unwrap_or(data).to_string(),
            None => UNKNOWN_PACKAGE.to_string(),
        }
    }
}

/// Which notifications reach the correlator
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationFilter {
    action: String,
    scheme: String,
}

impl NotificationFilter {
    #[must_use]
    pub fn new(action: impl Into<String>, scheme: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            scheme: scheme.into(),
        }
    }

    #[must_use]
    pub fn package_added() -> Self {
        Self::new(ACTION_PACKAGE_ADDED, PACKAGE_SCHEME)
    }

    #[must_use]
    pub fn matches(&self, notification: &SystemNotification) -> bool {
        notification.action == self.action && notification.scheme() == Some(self.scheme.as_str())
    }
}

impl Default for NotificationFilter {
    fn default() -> Self {
        Self::package_added()
    }
}

/// What the correlator did with one notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorrelationDecision {
    /// No commit is outstanding
    NotAwaiting,
    /// Installed by someone else, or the installer could not be determined
    ForeignInstaller {
        package: String,
        installer: Option<String>,
    },
    /// The pending attempt succeeded
    Resolved { package: String },
    /// Another completion got there first
    AlreadyResolved { package: String },
}

/// Resolves pending attempts from package-added notifications
#[derive(Clone)]
pub struct CompletionCorrelator {
    state: Arc<CompletionState>,
    own_installer_id: String,
    query: Arc<dyn InstallerQuery>,
    events: Option<EventSender>,
}

impl CompletionCorrelator {
    pub(crate) fn new(
        state: Arc<CompletionState>,
        own_installer_id: String,
        query: Arc<dyn InstallerQuery>,
        events: Option<EventSender>,
    ) -> Self {
        Self {
            state,
            own_installer_id,
            query,
            events,
        }
    }

    /// Handle one package-added notification
    pub async fn on_notification(&self, notification: &SystemNotification) -> CorrelationDecision {
        if !self.state.is_awaiting() {
            return CorrelationDecision::NotAwaiting;
        }

        let package = notification.package();
        let installer = match self.query.installer_of(&package).await {
            Ok(installer) => installer,
            Err(e) => {
                warn!(package = %package, error = %e, "installer lookup failed");
                None
            }
        };

        if installer.as_deref() != Some(self.own_installer_id.as_str()) {
            debug!(package = %package, installer = ?installer, "notification for a foreign install");
            self.events.emit(AppEvent::Install(InstallEvent::NotificationIgnored {
                package: package.clone(),
                reason: format!(
                    "installed by {}",
                    installer.as_deref().unwrap_or("an unknown installer")
                ),
            }));
            return CorrelationDecision::ForeignInstaller { package, installer };
        }

        if !self.state.claim() {
            warn!(package = %package, "completion already reported");
            return CorrelationDecision::AlreadyResolved { package };
        }

        let outcome = InstallationOutcome::Succeeded {
            package: package.clone(),
        };
        match self.state.resolve_current(outcome) {
            Some(attempt_id) => {
                info!(package = %package, attempt = %attempt_id, "installation succeeded");
                self.events.emit(AppEvent::Install(InstallEvent::Succeeded {
                    attempt_id: Some(attempt_id),
                    package: package.clone(),
                }));
                CorrelationDecision::Resolved { package }
            }
            None => CorrelationDecision::AlreadyResolved { package },
        }
    }

    /// Drive the correlator from a notification channel until it closes
    pub(crate) fn spawn(
        self,
        filter: NotificationFilter,
        mut notifications: broadcast::Receiver<SystemNotification>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match notifications.recv().await {
                    Ok(notification) if filter.matches(&notification) => {
                        let decision = self.on_notification(&notification).await;
                        debug!(?decision, "notification handled");
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "package notifications dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_extraction() {
        assert_eq!(
            SystemNotification::package_added("com.example").package(),
            "com.example"
        );
        assert_eq!(
            SystemNotification::new(ACTION_PACKAGE_ADDED, None).package(),
            UNKNOWN_PACKAGE
        );
    }

    #[test]
    fn only_the_leading_scheme_is_stripped() {
        let notification =
            SystemNotification::new(ACTION_PACKAGE_ADDED, Some("package:com.example".into()));
        assert_eq!(notification.package(), "com.example");

        let bare = SystemNotification::new(ACTION_PACKAGE_ADDED, Some("com.example".into()));
        assert_eq!(bare.package(), "com.example");
    }

    #[test]
    fn filter_checks_action_and_scheme() {
        let filter = NotificationFilter::package_added();
        assert!(filter.matches(&SystemNotification::package_added("com.a")));
        assert!(!filter.matches(&SystemNotification::new(
            "android.intent.action.PACKAGE_REMOVED",
            Some("package:com.a".into())
        )));
        assert!(!filter.matches(&SystemNotification::new(
            ACTION_PACKAGE_ADDED,
            Some("file:/sdcard/a.apk".into())
        )));
        assert!(!filter.matches(&SystemNotification::new(ACTION_PACKAGE_ADDED, None)));
    }
}
