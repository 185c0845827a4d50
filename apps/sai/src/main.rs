//! sai - install split and single APKs through pm install sessions
//!
//! This is the CLI application: it wires the configured shell backend into
//! the session installer, feeds it package notifications and waits for the
//! attempt's outcome.

mod cli;
mod display;
mod error;
mod events;
mod logging;
mod setup;
mod watcher;

use crate::cli::{Cli, Commands};
use crate::display::{CommandOutput, DoctorReport, OutputRenderer};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::setup::SystemSetup;
use clap::Parser;
use sai_config::Config;
use sai_errors::UserFacingError;
use sai_events::EventReceiver;
use sai_install::{DeviceInfo, InstallationOutcome};
use sai_shell::Shell;
use sai_source::FileSource;
use std::path::PathBuf;
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if json_mode {
            let code = match &e {
                CliError::Ops(inner) => inner.user_code(),
                _ => None,
            };
            let _ = OutputRenderer::new(true).render_failure(&e.to_string(), code);
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting sai v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global, &cli.command)?;

    let (event_sender, event_receiver) = sai_events::channel();
    let setup = SystemSetup::new(config, event_sender);

    let renderer = OutputRenderer::new(cli.global.json);
    let mut event_handler = EventHandler::new(cli.global.json, cli.global.debug);

    let config_path = cli
        .global
        .config
        .clone()
        .or_else(|| Config::default_path().ok());

    let result = execute_command_with_events(
        cli.command,
        &setup,
        config_path,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    setup: &SystemSetup,
    config_path: Option<PathBuf>,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<CommandOutput, CliError> {
    let mut command_future = Box::pin(execute_command(command, setup, config_path));

    // Handle events concurrently with command execution
    loop {
        select! {
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    setup: &SystemSetup,
    config_path: Option<PathBuf>,
) -> Result<CommandOutput, CliError> {
    match command {
        Commands::Install { paths, .. } => install(setup, paths).await,
        Commands::Doctor => Ok(CommandOutput::Doctor(doctor(setup, config_path).await)),
    }
}

async fn install(setup: &SystemSetup, paths: Vec<PathBuf>) -> Result<CommandOutput, CliError> {
    let source = open_source(paths).await?;
    let (installer, watcher) = setup.installer().await;

    let pending = installer.install_apk_files(source).await;
    let attempt_id = pending.attempt_id();
    let wait = setup.config().watch.completion_timeout();
    let outcome = tokio::time::timeout(wait, pending.outcome()).await;

    if let Some(watcher) = watcher {
        watcher.abort();
    }

    match outcome {
        Ok(Some(InstallationOutcome::Succeeded { package })) => Ok(CommandOutput::Installed {
            package,
            attempt_id,
        }),
        Ok(Some(InstallationOutcome::Failed { kind, diagnostic })) => {
            Err(CliError::InstallFailed { kind, diagnostic })
        }
        Ok(None) => Err(CliError::Abandoned),
        Err(_) => Err(CliError::Timeout {
            seconds: wait.as_secs(),
        }),
    }
}

/// One directory of APKs, or the APK files of one package
async fn open_source(paths: Vec<PathBuf>) -> Result<FileSource, CliError> {
    if let [single] = paths.as_slice() {
        let metadata = tokio::fs::metadata(single).await.map_err(|e| {
            CliError::InvalidArguments(format!("{}: {e}", single.display()))
        })?;
        if metadata.is_dir() {
            let source = FileSource::from_dir(single).await?;
            if source.is_empty() {
                return Err(CliError::InvalidArguments(format!(
                    "no .apk files in {}",
                    single.display()
                )));
            }
            return Ok(source);
        }
    }

    for path in &paths {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| CliError::InvalidArguments(format!("{}: {e}", path.display())))?;
        if !metadata.is_file() {
            return Err(CliError::InvalidArguments(format!(
                "{} is not a file; pass a single directory or APK files",
                path.display()
            )));
        }
    }
    Ok(FileSource::new(paths))
}

async fn doctor(setup: &SystemSetup, config_path: Option<PathBuf>) -> DoctorReport {
    let shell = setup.shell();
    let reason = shell.diagnose().await.err();
    let device = if reason.is_none() {
        DeviceInfo::probe(shell).await
    } else {
        DeviceInfo::unknown()
    };

    let config = setup.config();
    DoctorReport {
        backend: shell.name().to_string(),
        installer_name: setup.installer_name().to_string(),
        installer_id: config.general.installer_id.clone(),
        available: reason.is_none(),
        reason,
        device_summary: device.summary(
            &config.general.device_label,
            concat!("sai ", env!("CARGO_PKG_VERSION")),
        ),
        config_path: config_path.map(|p| p.display().to_string()),
    }
}

/// Initialize tracing/logging
fn init_tracing(json_mode: bool, debug_enabled_flag: bool) {
    // Check if debug logging is enabled
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_enabled_flag;

    if debug_enabled_flag {
        // Debug mode: structured JSON logs to file
        let log_dir = Config::logs_dir();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!("Warning: Failed to create log directory: {e}");
        }

        let log_file = log_dir.join(format!(
            "sai-{}.log",
            chrono::Utc::now().format("%Y%m%d-%H%M%S")
        ));

        match std::fs::File::create(&log_file) {
            Ok(file) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(
                        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
                            |_| {
                                tracing_subscriber::EnvFilter::new(
                                    "info,sai=debug,sai_install=debug,sai_shell=debug",
                                )
                            },
                        ),
                    )
                    .init();

                if !json_mode {
                    eprintln!("Debug logging enabled: {}", log_file.display());
                }
                return;
            }
            Err(e) => {
                eprintln!("Warning: Failed to create log file: {e}");
            }
        }
    }

    if json_mode {
        // JSON mode: keep stdout clean, send nothing to the console
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else if debug_enabled {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sai=debug")),
            )
            .init();
    } else {
        // Normal mode: events already reach the console, so logs stay quiet
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter("off")
            .init();
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(
    config: &mut Config,
    global: &cli::GlobalArgs,
    command: &Commands,
) -> Result<(), CliError> {
    if let Some(backend) = global.shell {
        config.shell.backend = backend;
    }
    if let Some(serial) = &global.serial {
        config.shell.serial = Some(serial.clone());
    }

    if let Commands::Install {
        timeout,
        installer_id,
        ..
    } = command
    {
        if let Some(timeout) = timeout {
            if *timeout == 0 {
                return Err(CliError::InvalidArguments(
                    "--timeout must be at least 1 second".to_string(),
                ));
            }
            config.watch.completion_timeout_secs = *timeout;
        }
        if let Some(installer_id) = installer_id {
            config.general.installer_id.clone_from(installer_id);
        }
    }

    Ok(())
}
