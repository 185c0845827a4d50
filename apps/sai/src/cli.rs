//! Command line interface definition

use clap::{Parser, Subcommand};
use sai_config::ShellBackend;
use std::path::PathBuf;

/// sai - install split and single APKs through pm install sessions
#[derive(Parser)]
#[command(name = "sai")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install split and single APKs through pm install sessions")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write structured debug logs to the sai log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Shell backend driving pm
    #[arg(long, global = true, value_enum)]
    pub shell: Option<ShellBackend>,

    /// adb device serial (adb backend only)
    #[arg(long, short = 's', global = true, value_name = "SERIAL")]
    pub serial: Option<String>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install one package from its APK files, or from a directory of them
    #[command(alias = "i")]
    Install {
        /// APK files of one package (base plus splits), or a single directory
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Seconds to wait for the installed-package notification
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Installer package id to record for the session
        #[arg(long, value_name = "PACKAGE")]
        installer_id: Option<String>,
    },

    /// Check that the shell backend works and show the device summary
    Doctor,
}
