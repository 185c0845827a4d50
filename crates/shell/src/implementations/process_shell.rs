//! Process-backed shell
//!
//! Runs each command as a child process of the host: either a root shell on
//! the device itself (`su -c`) or `adb shell` from a workstation. Payload
//! bytes are copied into the child's stdin while its output is captured.

use async_trait::async_trait;
use sai_errors::{Error, ShellError};
use sai_events::{AppEvent, EventSender, ShellEvent};
use std::convert::TryFrom;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::core::ShellContext;
use crate::process::{InputStream, Shell, ShellCommand, ShellResult};

/// Prefix of the line `pm` prints when it refuses a session operation
const PM_FAILURE_MARKER: &str = "Failure [";

/// How commands reach the device
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Transport {
    /// `<binary> -c <script>`
    Su { binary: String },
    /// `<binary> [-s <serial>] shell <script>`
    ///
    /// adb without the shell_v2 feature exits 0 whatever the remote command
    /// returned, so a `pm` failure line in stdout counts as exit code 1.
    Adb {
        binary: String,
        serial: Option<String>,
    },
}

/// Shell backend that spawns one host process per command
pub struct ProcessShell {
    transport: Transport,
    ctx: ShellContext,
}

impl ProcessShell {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            ctx: ShellContext::default(),
        }
    }

    /// Root shell reached through `binary -c`
    #[must_use]
    pub fn su(binary: impl Into<String>) -> Self {
        Self::new(Transport::Su {
            binary: binary.into(),
        })
    }

    /// Device reached through `adb shell`
    #[must_use]
    pub fn adb(binary: impl Into<String>, serial: Option<String>) -> Self {
        Self::new(Transport::Adb {
            binary: binary.into(),
            serial,
        })
    }

    /// Set the event sender for command events
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.ctx = ShellContext::new(Some(sender));
        self
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    fn host_program(&self) -> &str {
        match &self.transport {
            Transport::Su { binary } | Transport::Adb { binary, .. } => binary,
        }
    }

    fn adb_base(binary: &str, serial: Option<&String>) -> Command {
        let mut command = Command::new(binary);
        if let Some(serial) = serial {
            command.arg("-s").arg(serial);
        }
        command
    }

    /// Host process that runs `script` on the device
    fn host_command(&self, script: &str) -> Command {
        match &self.transport {
            Transport::Su { binary } => {
                let mut command = Command::new(binary);
                command.arg("-c").arg(script);
                command
            }
            Transport::Adb { binary, serial } => {
                let mut command = Self::adb_base(binary, serial.as_ref());
                command.arg("shell").arg(script);
                command
            }
        }
    }

    /// Probe the backend, describing why it cannot be used when it cannot
    ///
    /// # Errors
    ///
    /// Returns the human-readable reason the backend is unusable.
    pub async fn diagnose(&self) -> Result<(), String> {
        let mut command = match &self.transport {
            Transport::Su { .. } => self.host_command("id"),
            Transport::Adb { binary, serial } => {
                let mut command = Self::adb_base(binary, serial.as_ref());
                command.arg("get-state");
                command
            }
        };
        command.stdin(Stdio::null()).kill_on_drop(true);

        let output = command
            .output()
            .await
            .map_err(|e| format!("{}: {e}", self.host_program()))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        match &self.transport {
            Transport::Su { .. } if output.status.success() && stdout.contains("uid=0") => Ok(()),
            Transport::Su { .. } => Err(format!(
                "root access was not granted ({})",
                first_line(&stderr, &stdout)
            )),
            Transport::Adb { .. } if output.status.success() && stdout.trim() == "device" => {
                Ok(())
            }
            Transport::Adb { .. } => Err(format!(
                "no authorized device attached ({})",
                first_line(&stderr, &stdout)
            )),
        }
    }
}

fn first_line<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    preferred
        .lines()
        .chain(fallback.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("no output")
}

/// Exit status for an adb command, recovering `pm` failures that older adb
/// reports as success
fn adb_exit_code(exit_code: i32, stdout: &str) -> i32 {
    if exit_code == 0 && stdout.lines().any(|line| line.starts_with(PM_FAILURE_MARKER)) {
        1
    } else {
        exit_code
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[async_trait]
impl Shell for ProcessShell {
    fn name(&self) -> &str {
        match self.transport {
            Transport::Su { .. } => "su",
            Transport::Adb { .. } => "adb",
        }
    }

    async fn is_available(&self) -> bool {
        let reason = self.diagnose().await.err();
        if let Some(reason) = &reason {
            debug!(backend = self.name(), %reason, "shell unavailable");
        }
        let available = reason.is_none();
        self.ctx
            .emit_event(AppEvent::Shell(ShellEvent::AvailabilityChecked {
                backend: self.name().to_string(),
                available,
                reason,
            }));
        available
    }

    async fn unavailable_reason(&self) -> String {
        match self.diagnose().await {
            Ok(()) => format!("{} shell became unavailable", self.name()),
            Err(reason) => reason,
        }
    }

    async fn exec(
        &self,
        command: &ShellCommand,
        input: Option<InputStream>,
    ) -> Result<ShellResult, Error> {
        let start = Instant::now();
        let rendered = command.to_string();
        let script = command.to_script(|token| self.make_literal(token));
        debug!(backend = self.name(), command = %rendered, with_input = input.is_some(), "exec");

        self.ctx
            .emit_event(AppEvent::Shell(ShellEvent::CommandStarted {
                backend: self.name().to_string(),
                command: rendered.clone(),
                with_input: input.is_some(),
            }));

        let result: Result<ShellResult, ShellError> = async {
            let mut host = self.host_command(&script);
            host.stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

            let mut child = host.spawn().map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ShellError::BackendNotFound {
                        program: self.host_program().to_string(),
                    }
                } else {
                    ShellError::ProcessExecutionFailed {
                        command: rendered.clone(),
                        message: e.to_string(),
                    }
                }
            })?;

            let stdin = child.stdin.take();
            let feed = async move {
                match (input, stdin) {
                    (Some(mut reader), Some(mut stdin)) => {
                        tokio::io::copy(&mut reader, &mut stdin).await?;
                        stdin.shutdown().await
                    }
                    _ => Ok(()),
                }
            };

            let (output, fed) = tokio::join!(child.wait_with_output(), feed);
            let output = output.map_err(|e| ShellError::ProcessExecutionFailed {
                command: rendered.clone(),
                message: e.to_string(),
            })?;

            let exit_code = output.status.code().unwrap_or(-1);
            if let Err(e) = fed {
                // A failing command often closes stdin early; its exit code
                // is the better diagnostic then.
                if exit_code == 0 {
                    return Err(ShellError::StreamFailed {
                        command: rendered.clone(),
                        message: e.to_string(),
                    });
                }
                debug!(command = %rendered, error = %e, "stdin closed by failing command");
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            let exit_code = match self.transport {
                Transport::Su { .. } => exit_code,
                Transport::Adb { .. } => adb_exit_code(exit_code, &stdout),
            };

            Ok(ShellResult::new(
                command.clone(),
                exit_code,
                stdout,
                String::from_utf8_lossy(&output.stderr),
            ))
        }
        .await;

        let duration = start.elapsed();
        match &result {
            Ok(res) => self
                .ctx
                .emit_event(AppEvent::Shell(ShellEvent::CommandCompleted {
                    command: rendered,
                    exit_code: res.exit_code(),
                    duration_ms: duration_to_millis(duration),
                    stdout_bytes: res.out().len(),
                    stderr_bytes: res.err().len(),
                })),
            Err(e) => self
                .ctx
                .emit_event(AppEvent::Shell(ShellEvent::CommandFailed {
                    command: rendered,
                    error_message: e.to_string(),
                    duration_ms: duration_to_millis(duration),
                })),
        }

        result.map_err(Error::from)
    }
}
