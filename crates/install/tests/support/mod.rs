//! Test doubles: a scripted shell, an in-memory package source and a fixed
//! installer lookup.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sai_errors::{Error, ShellError, SourceError};
use sai_install::InstallerQuery;
use sai_shell::{InputStream, Shell, ShellCommand, ShellResult};
use sai_source::{PackageSource, PayloadLength, PayloadStream};
use tokio::io::AsyncReadExt;

/// Scripted response for a command
#[derive(Clone, Debug)]
pub enum Reply {
    Exit {
        code: i32,
        out: String,
        err: String,
    },
    Broken(String),
}

impl Reply {
    pub fn ok(out: &str) -> Self {
        Self::Exit {
            code: 0,
            out: out.to_string(),
            err: String::new(),
        }
    }

    pub fn fail(code: i32, err: &str) -> Self {
        Self::Exit {
            code,
            out: String::new(),
            err: err.to_string(),
        }
    }
}

/// A command the scripted shell ran, with the bytes piped into it
#[derive(Clone, Debug)]
pub struct Executed {
    pub command: String,
    pub input: Option<Vec<u8>>,
}

/// Shell answering by command prefix; the last reply of a rule repeats
pub struct ScriptedShell {
    available: bool,
    rules: Mutex<Vec<(String, VecDeque<Reply>)>>,
    log: Mutex<Vec<Executed>>,
}

impl ScriptedShell {
    pub fn new() -> Self {
        Self {
            available: true,
            rules: Mutex::new(Vec::new()),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new()
        }
    }

    pub fn on(self, prefix: &str, replies: impl IntoIterator<Item = Reply>) -> Self {
        self.rules
            .lock()
            .unwrap()
            .push((prefix.to_string(), replies.into_iter().collect()));
        self
    }

    /// A shell that creates session 42 and accepts every write and commit
    pub fn accepting() -> Self {
        Self::new().on(
            "pm install-create",
            [Reply::ok("Success: created install session [42]\n")],
        )
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.log.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.executed().into_iter().map(|e| e.command).collect()
    }

    fn reply_for(&self, command: &str) -> Reply {
        let mut rules = self.rules.lock().unwrap();
        for (prefix, replies) in rules.iter_mut() {
            if command.starts_with(prefix.as_str()) {
                if replies.len() > 1 {
                    return replies.pop_front().unwrap();
                }
                if let Some(reply) = replies.front() {
                    return reply.clone();
                }
            }
        }
        Reply::ok("Success\n")
    }
}

#[async_trait]
impl Shell for ScriptedShell {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn unavailable_reason(&self) -> String {
        "root access was not granted".to_string()
    }

    async fn exec(
        &self,
        command: &ShellCommand,
        input: Option<InputStream>,
    ) -> Result<ShellResult, Error> {
        let rendered = command.to_string();
        let input = match input {
            Some(mut stream) => {
                let mut bytes = Vec::new();
                stream.read_to_end(&mut bytes).await?;
                Some(bytes)
            }
            None => None,
        };
        self.log.lock().unwrap().push(Executed {
            command: rendered.clone(),
            input,
        });

        match self.reply_for(&rendered) {
            Reply::Exit { code, out, err } => Ok(ShellResult::new(command.clone(), code, out, err)),
            Reply::Broken(message) => Err(ShellError::ProcessExecutionFailed {
                command: rendered,
                message,
            }
            .into()),
        }
    }
}

/// One payload of a [`MemorySource`]
#[derive(Clone, Debug)]
pub struct MemoryPayload {
    pub name: String,
    pub bytes: Vec<u8>,
    pub known_length: bool,
}

impl MemoryPayload {
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        Self {
            name: name.to_string(),
            bytes: bytes.to_vec(),
            known_length: true,
        }
    }

    pub fn without_length(name: &str, bytes: &[u8]) -> Self {
        Self {
            known_length: false,
            ..Self::new(name, bytes)
        }
    }
}

/// In-memory package source counting its closes
pub struct MemorySource {
    payloads: Vec<MemoryPayload>,
    cursor: Option<usize>,
    closes: Arc<AtomicUsize>,
    fail_close: bool,
}

impl MemorySource {
    pub fn new(payloads: Vec<MemoryPayload>) -> Self {
        Self {
            payloads,
            cursor: None,
            closes: Arc::new(AtomicUsize::new(0)),
            fail_close: false,
        }
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn close_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.closes)
    }

    fn current(&self) -> Option<&MemoryPayload> {
        self.cursor.and_then(|i| self.payloads.get(i))
    }
}

#[async_trait]
impl PackageSource for MemorySource {
    async fn next_payload(&mut self) -> Result<bool, Error> {
        let next = self.cursor.map_or(0, |i| i + 1);
        self.cursor = Some(next);
        Ok(next < self.payloads.len())
    }

    fn payload_length(&self) -> PayloadLength {
        match self.current() {
            Some(p) if p.known_length => PayloadLength::Known(p.bytes.len() as u64),
            _ => PayloadLength::Unknown,
        }
    }

    fn payload_name(&self) -> Option<&str> {
        self.current().map(|p| p.name.as_str())
    }

    async fn open_payload(&mut self) -> Result<PayloadStream, Error> {
        let payload = self.current().ok_or(SourceError::NoPayloadSelected)?;
        Ok(Box::new(Cursor::new(payload.bytes.clone())))
    }

    fn implementation_name(&self) -> &str {
        "MemorySource"
    }

    async fn close(&mut self) -> Result<(), Error> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            return Err(SourceError::CloseFailed {
                message: "handle already gone".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Installer lookup backed by a fixed table
#[derive(Default)]
pub struct FixedQuery {
    installers: HashMap<String, Option<String>>,
    broken: bool,
}

impl FixedQuery {
    pub fn with(mut self, package: &str, installer: Option<&str>) -> Self {
        self.installers
            .insert(package.to_string(), installer.map(str::to_string));
        self
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl InstallerQuery for FixedQuery {
    async fn installer_of(&self, package: &str) -> Result<Option<String>, Error> {
        if self.broken {
            return Err(ShellError::BackendNotFound {
                program: "pm".to_string(),
            }
            .into());
        }
        Ok(self.installers.get(package).cloned().flatten())
    }
}
