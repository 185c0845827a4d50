//! Concrete shell backends

pub mod process_shell;
