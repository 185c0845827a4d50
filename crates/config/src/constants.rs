//! Fixed names shared by the CLI and the config loader

pub const APP_DIR_NAME: &str = "sai";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const LOGS_DIR_NAME: &str = "logs";

/// Package id passed to `pm install-create -i` when none is configured
pub const DEFAULT_INSTALLER_ID: &str = "com.android.shell";
