//! `pm` command descriptors
//!
//! Pure constructors; nothing here talks to a shell.

use sai_shell::ShellCommand;

use crate::ladder::SessionId;

const PM: &str = "pm";

/// Session-creation candidates, most specific first.
///
/// Some package managers reject `--install-location`, so the plain form is
/// kept as a fallback.
#[must_use]
pub fn create_session_candidates(installer_id: &str) -> Vec<ShellCommand> {
    vec![
        ShellCommand::new(
            PM,
            [
                "install-create",
                "-r",
                "--install-location",
                "0",
                "-i",
                installer_id,
            ],
        ),
        ShellCommand::new(PM, ["install-create", "-r", "-i", installer_id]),
    ]
}

/// Name a payload is staged under inside the session
#[must_use]
pub fn payload_file_name(index: usize) -> String {
    format!("{index}.apk")
}

/// `pm install-write -S <bytes> <session> <index>.apk`, fed the payload on stdin
#[must_use]
pub fn write_payload(bytes: u64, session: SessionId, index: usize) -> ShellCommand {
    ShellCommand::new(
        PM,
        [
            "install-write".to_string(),
            "-S".to_string(),
            bytes.to_string(),
            session.to_string(),
            payload_file_name(index),
        ],
    )
}

#[must_use]
pub fn commit(session: SessionId) -> ShellCommand {
    ShellCommand::new(PM, ["install-commit".to_string(), session.to_string()])
}

#[must_use]
pub fn abandon(session: SessionId) -> ShellCommand {
    ShellCommand::new(PM, ["install-abandon".to_string(), session.to_string()])
}

/// `pm list packages -i [<filter>]`; the filter is a substring match
#[must_use]
pub fn list_packages_with_installer(filter: Option<&str>) -> ShellCommand {
    let mut args = vec!["list", "packages", "-i"];
    args.extend(filter);
    ShellCommand::new(PM, args)
}

/// Full listing with installers and version codes, used to spot installs
#[must_use]
pub fn list_packages_snapshot() -> ShellCommand {
    ShellCommand::new(PM, ["list", "packages", "-i", "--show-versioncode"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_candidates_differ_only_in_install_location() {
        let candidates = create_session_candidates("com.example.sai");
        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].to_string(),
            "pm install-create -r --install-location 0 -i com.example.sai"
        );
        assert_eq!(
            candidates[1].to_string(),
            "pm install-create -r -i com.example.sai"
        );
    }

    #[test]
    fn session_commands_render() {
        let session = SessionId::new(42);
        assert_eq!(
            write_payload(1024, session, 3).to_string(),
            "pm install-write -S 1024 42 3.apk"
        );
        assert_eq!(commit(session).to_string(), "pm install-commit 42");
        assert_eq!(abandon(session).to_string(), "pm install-abandon 42");
    }

    #[test]
    fn list_packages_filter_is_optional() {
        assert_eq!(
            list_packages_with_installer(None).to_string(),
            "pm list packages -i"
        );
        assert_eq!(
            list_packages_with_installer(Some("com.foo")).to_string(),
            "pm list packages -i com.foo"
        );
    }
}
