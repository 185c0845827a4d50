//! Installer-of-record lookups

use std::sync::Arc;

use async_trait::async_trait;
use sai_errors::{Error, ShellError};
use sai_shell::Shell;

use crate::commands;

/// Answers which package installed a given package
#[async_trait]
pub trait InstallerQuery: Send + Sync {
    /// Installer of record for `package`; `Ok(None)` when unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself could not be performed.
    async fn installer_of(&self, package: &str) -> Result<Option<String>, Error>;
}

/// One `package:<id> ... installer=<who>` line of `pm list packages -i`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PackageListing {
    pub package: String,
    pub installer: Option<String>,
    /// Present when listed with `--show-versioncode`
    pub version_code: Option<u64>,
}

/// Parse `pm list packages -i` output; lines of any other shape are skipped
#[must_use]
pub fn parse_package_listing(output: &str) -> Vec<PackageListing> {
    output
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix("package:")?;
            let mut tokens = rest.split_whitespace();
            let package = tokens.next()?.to_string();
            let mut installer = None;
            let mut version_code = None;
            for token in tokens {
                if let Some(who) = token.strip_prefix("installer=") {
                    installer = Some(who).filter(|who| !who.is_empty() && *who != "null");
                } else if let Some(code) = token.strip_prefix("versionCode:") {
                    version_code = code.parse().ok();
                }
            }
            Some(PackageListing {
                package,
                installer: installer.map(str::to_string),
                version_code,
            })
        })
        .collect()
}

/// Looks the installer up with `pm list packages -i <package>`
pub struct PmInstallerQuery {
    shell: Arc<dyn Shell>,
}

impl PmInstallerQuery {
    #[must_use]
    pub fn new(shell: Arc<dyn Shell>) -> Self {
        Self { shell }
    }
}

#[async_trait]
impl InstallerQuery for PmInstallerQuery {
    async fn installer_of(&self, package: &str) -> Result<Option<String>, Error> {
        let command = commands::list_packages_with_installer(Some(package));
        let result = self.shell.exec(&command, None).await?;
        if !result.is_successful() {
            return Err(ShellError::CommandFailed {
                command: command.to_string(),
                output: result.to_string(),
            }
            .into());
        }

        // The filter is a substring match, so pick the exact entry.
        Ok(parse_package_listing(result.out())
            .into_iter()
            .find(|listing| listing.package == package)
            .and_then(|listing| listing.installer))
    }
}
