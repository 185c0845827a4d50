//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use sai_events::{AppEvent, GeneralEvent, InstallEvent, ShellEvent};

/// Event handler for status lines and user feedback
pub struct EventHandler {
    /// Suppress console output (JSON mode)
    quiet: bool,
    /// Show per-command shell events
    debug_enabled: bool,
}

impl EventHandler {
    pub fn new(quiet: bool, debug_enabled: bool) -> Self {
        Self {
            quiet,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);
        if self.quiet {
            return;
        }

        match event {
            AppEvent::Install(event) => self.handle_install_event(event),
            AppEvent::Shell(event) => self.handle_shell_event(event),
            AppEvent::General(event) => self.handle_general_event(event),
        }
    }

    fn handle_install_event(&self, event: InstallEvent) {
        match event {
            InstallEvent::Started {
                installer, source, ..
            } => {
                self.show_status(&format!("Installing via {installer} ({source})"));
            }
            InstallEvent::SessionCandidateFailed { command, .. } => {
                self.show_status(&format!("  '{command}' failed, trying next variant"));
            }
            InstallEvent::SessionCreated { session_id, .. } => {
                self.show_status(&format!("  Session {session_id} created"));
            }
            InstallEvent::PayloadWriting {
                index, name, bytes, ..
            } => {
                self.show_status(&format!("  Writing {name} as {index}.apk ({bytes} bytes)"));
            }
            InstallEvent::PayloadWritten { .. } => {}
            InstallEvent::AwaitingCompletion { session_id, .. } => {
                self.show_status(&format!(
                    "  Session {session_id} committed, waiting for the package manager"
                ));
            }
            InstallEvent::SessionAbandoned {
                session_id,
                success,
                ..
            } => {
                if success {
                    self.show_status(&format!("  Session {session_id} abandoned"));
                } else {
                    self.show_warning(&format!("Could not abandon session {session_id}"));
                }
            }
            InstallEvent::NotificationIgnored { package, reason } => {
                if self.debug_enabled {
                    self.show_status(&format!("  Ignoring {package}: {reason}"));
                }
            }
            InstallEvent::Succeeded { package, .. } => {
                self.show_status(&format!("Installed {package}"));
            }
            // The final error is printed by main
            InstallEvent::Failed { .. } => {}
        }
    }

    fn handle_shell_event(&self, event: ShellEvent) {
        if !self.debug_enabled {
            return;
        }
        match event {
            ShellEvent::CommandStarted { backend, command, .. } => {
                self.show_status(&format!("  [{backend}] $ {command}"));
            }
            ShellEvent::CommandCompleted {
                exit_code,
                duration_ms,
                ..
            } => {
                self.show_status(&format!("  [exit {exit_code}, {duration_ms} ms]"));
            }
            ShellEvent::CommandFailed {
                command,
                error_message,
                ..
            } => {
                self.show_error(&format!("{command}: {error_message}"));
            }
            ShellEvent::AvailabilityChecked {
                backend,
                available,
                reason,
            } => {
                let state = if available { "available" } else { "unavailable" };
                match reason {
                    Some(reason) => self.show_status(&format!("  {backend} {state}: {reason}")),
                    None => self.show_status(&format!("  {backend} {state}")),
                }
            }
        }
    }

    fn handle_general_event(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                self.show_warning(&format!("{message}: {context}"));
            }
        }
    }

    fn show_status(&self, message: &str) {
        eprintln!("{message}");
    }

    fn show_warning(&self, message: &str) {
        eprintln!("Warning: {message}");
    }

    fn show_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }
}
