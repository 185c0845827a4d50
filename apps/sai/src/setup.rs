//! Component wiring for one CLI run

use std::sync::Arc;

use crate::watcher::PackageWatcher;
use sai_config::{Config, ShellBackend as BackendKind};
use sai_events::EventSender;
use sai_install::{
    DeviceInfo, InstallConfig, PmInstallerQuery, ShellBackend, ShellPackageInstaller,
};
use sai_shell::{ProcessShell, Shell};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Notifications buffered between the watcher and the correlator
const NOTIFICATION_BUFFER: usize = 64;

/// Shell and installer built from the effective configuration
pub struct SystemSetup {
    config: Config,
    shell: Arc<ProcessShell>,
    events: EventSender,
}

impl SystemSetup {
    pub fn new(config: Config, events: EventSender) -> Self {
        let shell = match config.shell.backend {
            BackendKind::Su => ProcessShell::su(config.shell.su_binary.clone()),
            BackendKind::Adb => {
                ProcessShell::adb(config.shell.adb_binary.clone(), config.shell.serial.clone())
            }
        }
        .with_event_sender(events.clone());

        Self {
            config,
            shell: Arc::new(shell),
            events,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn shell(&self) -> &ProcessShell {
        &self.shell
    }

    /// Name the installer goes by in diagnostics
    pub fn installer_name(&self) -> &'static str {
        match self.config.shell.backend {
            BackendKind::Su => "Rooted",
            BackendKind::Adb => "ADB",
        }
    }

    /// Build the installer and start the package watcher feeding it.
    ///
    /// The watcher handle must be aborted by the caller when done.
    pub async fn installer(&self) -> (ShellPackageInstaller, Option<JoinHandle<()>>) {
        let shared: Arc<dyn Shell> = self.shell.clone();

        let device = DeviceInfo::probe(shared.as_ref()).await;
        debug!(?device, "device probed");

        let (sender, receiver) = broadcast::channel(NOTIFICATION_BUFFER);
        let watcher = PackageWatcher::new(
            Arc::clone(&shared),
            self.config.watch.poll_interval(),
            sender,
        );

        let install_config = InstallConfig::default()
            .with_installer_id(self.config.general.installer_id.clone())
            .with_device_label(self.config.general.device_label.clone())
            .with_device(device)
            .with_abandon_on_failure(self.config.install.abandon_on_failure)
            .with_app_version(concat!("sai ", env!("CARGO_PKG_VERSION")));

        let installer = ShellPackageInstaller::new(
            Box::new(ShellBackend::new(Arc::clone(&shared), self.installer_name())),
            install_config,
            Arc::new(PmInstallerQuery::new(shared)),
            receiver,
            Some(self.events.clone()),
        );

        // Without a baseline no install can be observed; the attempt itself
        // still reports shell problems, so carry on.
        let watcher = match watcher.start().await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "package watcher not started");
                None
            }
        };
        info!(installer = self.installer_name(), "installer ready");
        (installer, watcher)
    }
}
