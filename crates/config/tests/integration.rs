//! Integration tests for config

#[cfg(test)]
mod tests {
    use sai_config::*;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for var in [
            "SAI_SHELL",
            "SAI_ADB_SERIAL",
            "SAI_INSTALLER_ID",
            "SAI_COMPLETION_TIMEOUT",
        ] {
            std::env::remove_var(var);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
installer_id = "org.example.installer"

[shell]
backend = "su"
su_binary = "/system/xbin/su"

[watch]
completion_timeout_secs = 30

[install]
abandon_on_failure = false
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.installer_id, "org.example.installer");
        assert_eq!(config.general.device_label, "Device");
        assert_eq!(config.shell.backend, ShellBackend::Su);
        assert_eq!(config.shell.su_binary, "/system/xbin/su");
        assert_eq!(config.shell.adb_binary, "adb");
        assert_eq!(config.watch.completion_timeout_secs, 30);
        assert_eq!(config.watch.poll_interval_ms, 500);
        assert!(!config.install.abandon_on_failure);
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from_file(&dir.path().join("absent.toml")).await;
        assert!(matches!(
            result,
            Err(sai_errors::Error::Config(sai_errors::ConfigError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_merge_env() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("SAI_SHELL", "su");
        std::env::set_var("SAI_ADB_SERIAL", "emulator-5554");
        std::env::set_var("SAI_COMPLETION_TIMEOUT", "15");

        let mut config = Config::default();
        config.merge_env().unwrap();

        assert_eq!(config.shell.backend, ShellBackend::Su);
        assert_eq!(config.shell.serial.as_deref(), Some("emulator-5554"));
        assert_eq!(config.watch.completion_timeout_secs, 15);

        clear_env();
    }

    #[test]
    fn test_invalid_env_value() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("SAI_SHELL", "telnet");

        let mut config = Config::default();
        let result = config.merge_env();
        assert!(result.is_err());

        clear_env();
    }
}
