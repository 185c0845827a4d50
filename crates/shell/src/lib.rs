//! Privileged shell abstraction for driving the device package manager.
//!
//! This crate provides:
//! - `ShellCommand` / `ShellResult`, the immutable command and transcript types
//! - the `Shell` trait the installer consumes
//! - `ProcessShell`, a backend that reaches `pm` through `su -c` or `adb shell`
//!
//! A command that exits non-zero is a normal `ShellResult`; only failures to
//! run the command at all surface as errors.

pub mod core;
pub mod implementations;
pub mod literal;
pub mod process;

pub use core::ShellContext;
pub use implementations::process_shell::{ProcessShell, Transport};
pub use literal::quote;
pub use process::{InputStream, Shell, ShellCommand, ShellResult};
