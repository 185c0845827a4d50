//! Command, result and backend trait

use async_trait::async_trait;
use sai_errors::Error;
use std::fmt;
use tokio::io::AsyncRead;

use crate::literal::quote;

/// Byte stream piped into a command's standard input
pub type InputStream = Box<dyn AsyncRead + Send + Unpin>;

/// One invocation of the device command interpreter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShellCommand {
    program: String,
    args: Vec<String>,
}

impl ShellCommand {
    /// Create a new command
    pub fn new<I, S>(program: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            program: program.to_string(),
            args: args.into_iter().map(|a| a.as_ref().to_string()).collect(),
        }
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// All tokens, program first
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }

    /// Render as a single script line with every token quoted by `literal`
    pub fn to_script(&self, literal: impl Fn(&str) -> String) -> String {
        self.tokens().map(literal).collect::<Vec<_>>().join(" ")
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tokens().collect::<Vec<_>>().join(" "))
    }
}

/// Captured outcome of one executed command
#[derive(Clone, Debug)]
pub struct ShellResult {
    command: ShellCommand,
    exit_code: i32,
    out: String,
    err: String,
}

impl ShellResult {
    #[must_use]
    pub fn new(
        command: ShellCommand,
        exit_code: i32,
        out: impl Into<String>,
        err: impl Into<String>,
    ) -> Self {
        Self {
            command,
            exit_code,
            out: out.into(),
            err: err.into(),
        }
    }

    /// Exit code 0
    #[must_use]
    pub fn is_successful(&self) -> bool {
        self.exit_code == 0
    }

    #[must_use]
    pub fn command(&self) -> &ShellCommand {
        &self.command
    }

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Captured standard output
    #[must_use]
    pub fn out(&self) -> &str {
        &self.out
    }

    /// Captured standard error
    #[must_use]
    pub fn err(&self) -> &str {
        &self.err
    }
}

impl fmt::Display for ShellResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Command: {}\nExit code: {}\nOut:\n{}\n=============\nErr:\n{}",
            self.command, self.exit_code, self.out, self.err
        )
    }
}

/// A privileged command interpreter the installer can drive
#[async_trait]
pub trait Shell: Send + Sync {
    /// Short backend name for diagnostics
    fn name(&self) -> &str;

    /// Whether commands can be run at all
    async fn is_available(&self) -> bool;

    /// Why [`Shell::is_available`] returned false, for diagnostics
    async fn unavailable_reason(&self) -> String {
        format!("{} shell is not available", self.name())
    }

    /// Execute a command, optionally piping `input` into its stdin.
    ///
    /// Non-zero exits are reported through [`ShellResult::is_successful`];
    /// an `Err` means the command could not be run or its input failed.
    async fn exec(
        &self,
        command: &ShellCommand,
        input: Option<InputStream>,
    ) -> Result<ShellResult, Error>;

    /// Make `token` safe to embed in a command line for this backend
    fn make_literal(&self, token: &str) -> String {
        quote(token)
    }
}
