// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! OS collaborators invoked by the command handler.

pub mod notification;
pub mod shutdown;

pub use notification::{DesktopNotifier, LogNotifier};
pub use shutdown::CommandShutdown;

/// Program plus arguments, built separately from execution so the argument
/// shape can be checked without touching the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl PlatformCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn to_command(&self) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command.args(&self.args);
        command
    }
}
