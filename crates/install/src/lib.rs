#![warn(clippy::pedantic)]
#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Staged package installation through `pm` install sessions
//!
//! An attempt creates a session with a ladder of `pm install-create`
//! variants, streams each payload into it with `pm install-write` and
//! commits. A rejected commit fails at once; an accepted one is resolved by
//! the completion correlator when the package-added notification for a
//! package installed by us arrives. Each attempt yields exactly one
//! [`InstallationOutcome`].

mod backend;
pub mod commands;
mod correlator;
mod environment;
mod installer;
mod ladder;
mod outcome;
mod query;

pub use backend::{InstallerBackend, ShellBackend};
pub use correlator::{
    CompletionCorrelator, CorrelationDecision, NotificationFilter, SystemNotification,
    ACTION_PACKAGE_ADDED, PACKAGE_SCHEME, UNKNOWN_PACKAGE,
};
pub use environment::{source_tag, DeviceInfo, UNKNOWN_VALUE};
pub use installer::{InstallConfig, ShellPackageInstaller, DEFAULT_INSTALLER_ID};
pub use ladder::{extract_session_id, SessionId, SessionLadder};
pub use outcome::{FailureKind, InstallationOutcome, PendingInstall};
pub use query::{parse_package_listing, InstallerQuery, PackageListing, PmInstallerQuery};

// Re-export EventSender for callers wiring up the installer
pub use sai_events::EventSender;
