//! Installer strategy: which shell, under which name

use std::sync::Arc;

use async_trait::async_trait;
use sai_shell::Shell;

/// Supplies the shell an installer drives and how it presents itself
#[async_trait]
pub trait InstallerBackend: Send + Sync {
    fn shell(&self) -> &dyn Shell;

    /// Name used in diagnostics, e.g. "Rooted" or "ADB"
    fn installer_name(&self) -> &str;

    /// Why the shell cannot be used, asked only after `is_available` failed
    async fn shell_unavailable_message(&self) -> String {
        self.shell().unavailable_reason().await
    }
}

/// Backend over any shared [`Shell`]
pub struct ShellBackend {
    shell: Arc<dyn Shell>,
    name: String,
}

impl ShellBackend {
    #[must_use]
    pub fn new(shell: Arc<dyn Shell>, name: impl Into<String>) -> Self {
        Self {
            shell,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn shared_shell(&self) -> Arc<dyn Shell> {
        Arc::clone(&self.shell)
    }
}

#[async_trait]
impl InstallerBackend for ShellBackend {
    fn shell(&self) -> &dyn Shell {
        self.shell.as_ref()
    }

    fn installer_name(&self) -> &str {
        &self.name
    }
}
