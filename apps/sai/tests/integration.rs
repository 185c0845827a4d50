//! Integration tests for the sai CLI

use std::process::Command;

fn sai() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_sai"));
    for var in ["SAI_SHELL", "SAI_ADB_SERIAL", "SAI_INSTALLER_ID", "SAI_COMPLETION_TIMEOUT", "RUST_LOG"] {
        command.env_remove(var);
    }
    command
}

#[test]
fn test_cli_version() {
    let output = sai().arg("--version").output().expect("Failed to execute sai");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("sai"));
}

#[test]
fn test_cli_help() {
    let output = sai().arg("--help").output().expect("Failed to execute sai");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pm install sessions"));
    assert!(stdout.contains("install"));
    assert!(stdout.contains("doctor"));
}

#[test]
fn test_cli_invalid_command() {
    let output = sai()
        .arg("invalid-command")
        .output()
        .expect("Failed to execute sai");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unrecognized subcommand"));
}

#[test]
fn test_install_requires_paths() {
    let output = sai().arg("install").output().expect("Failed to execute sai");

    assert!(!output.status.success());
}

#[test]
fn test_install_missing_file_fails_before_touching_device() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[shell]\nbackend = \"su\"\nsu_binary = \"/nonexistent/sai-su\"\n")
        .unwrap();

    let output = sai()
        .arg("--config")
        .arg(&config)
        .args(["install", "/nonexistent/base.apk"])
        .output()
        .expect("Failed to execute sai");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid arguments"));
    assert!(stderr.contains("/nonexistent/base.apk"));
}

#[test]
fn test_install_with_unavailable_shell_reports_failure() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[shell]\nbackend = \"su\"\nsu_binary = \"/nonexistent/sai-su\"\n")
        .unwrap();
    let apk = temp.path().join("base.apk");
    std::fs::write(&apk, b"not really an apk").unwrap();

    let output = sai()
        .arg("--config")
        .arg(&config)
        .arg("install")
        .arg(&apk)
        .output()
        .expect("Failed to execute sai");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Installation via Rooted failed"));
}

#[test]
fn test_doctor_json_reports_unavailable_shell() {
    let temp = tempfile::tempdir().unwrap();
    let config = temp.path().join("config.toml");
    std::fs::write(&config, "[shell]\nbackend = \"su\"\nsu_binary = \"/nonexistent/sai-su\"\n")
        .unwrap();

    let output = sai()
        .arg("--json")
        .arg("--config")
        .arg(&config)
        .arg("doctor")
        .output()
        .expect("Failed to execute sai");

    assert!(output.status.success());
    let report: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("doctor prints JSON");
    assert_eq!(report["available"], serde_json::Value::Bool(false));
    assert_eq!(report["backend"], "su");
    assert_eq!(report["installer"], "Rooted");
}
