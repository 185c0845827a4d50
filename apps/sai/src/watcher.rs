//! Polling source of package-added notifications
//!
//! The host has no broadcast receiver on the device, so installs are spotted
//! by diffing `pm list packages -i --show-versioncode` snapshots. A package
//! that appears, or whose installer or version code changes, is announced as
//! a package-added notification.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use sai_errors::{Error, ShellError};
use sai_install::{commands, parse_package_listing, SystemNotification};
use sai_shell::Shell;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Installer and version code per package
pub type Snapshot = HashMap<String, (Option<String>, Option<u64>)>;

pub struct PackageWatcher {
    shell: Arc<dyn Shell>,
    interval: Duration,
    sender: broadcast::Sender<SystemNotification>,
}

impl PackageWatcher {
    pub fn new(
        shell: Arc<dyn Shell>,
        interval: Duration,
        sender: broadcast::Sender<SystemNotification>,
    ) -> Self {
        Self {
            shell,
            interval,
            sender,
        }
    }

    async fn snapshot(&self) -> Result<Snapshot, Error> {
        let command = commands::list_packages_snapshot();
        let result = self.shell.exec(&command, None).await?;
        if !result.is_successful() {
            return Err(ShellError::CommandFailed {
                command: command.to_string(),
                output: result.to_string(),
            }
            .into());
        }
        Ok(parse_package_listing(result.out())
            .into_iter()
            .map(|l| (l.package, (l.installer, l.version_code)))
            .collect())
    }

    /// Take the baseline snapshot, then poll in the background.
    ///
    /// The baseline is taken before this returns so an install started
    /// afterwards is always seen as a change.
    pub async fn start(self) -> Result<JoinHandle<()>, Error> {
        let mut previous = self.snapshot().await?;
        debug!(packages = previous.len(), "package watcher baseline taken");

        Ok(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let current = match self.snapshot().await {
                    Ok(current) => current,
                    Err(e) => {
                        warn!(error = %e, "package snapshot failed");
                        continue;
                    }
                };

                for package in changed_packages(&previous, &current) {
                    debug!(package = %package, "package added or replaced");
                    if self
                        .sender
                        .send(SystemNotification::package_added(&package))
                        .is_err()
                    {
                        // No receivers left
                        return;
                    }
                }
                previous = current;
            }
        }))
    }
}

/// Packages that are new in `current` or whose entry changed
pub fn changed_packages(previous: &Snapshot, current: &Snapshot) -> Vec<String> {
    let mut changed: Vec<String> = current
        .iter()
        .filter(|(package, entry)| previous.get(*package) != Some(*entry))
        .map(|(package, _)| package.clone())
        .collect();
    changed.sort();
    changed
}
