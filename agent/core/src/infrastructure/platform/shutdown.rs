// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use std::process::Stdio;

use super::PlatformCommand;
use crate::domain::platform::{PlatformError, PlatformShutdown};

/// Schedules a shutdown through the OS `shutdown` command.
///
/// The child is spawned and left running; the agent never waits on it.
#[derive(Debug, Default)]
pub struct CommandShutdown;

impl CommandShutdown {
    pub fn new() -> Self {
        Self
    }

    /// The native shutdown invocation for this platform.
    pub fn command(delay_seconds: u64, message: &str) -> PlatformCommand {
        #[cfg(windows)]
        {
            PlatformCommand::new("shutdown")
                .arg("/s")
                .arg("/t")
                .arg(delay_seconds.to_string())
                .arg("/c")
                .arg(message)
        }

        #[cfg(not(windows))]
        {
            // Unix shutdown only accepts whole minutes
            let when = if delay_seconds == 0 {
                "now".to_string()
            } else {
                format!("+{}", delay_seconds.div_ceil(60))
            };
            PlatformCommand::new("shutdown").arg("-h").arg(when).arg(message)
        }
    }
}

impl PlatformShutdown for CommandShutdown {
    fn schedule(&self, delay_seconds: u64, message: &str) -> Result<(), PlatformError> {
        let command = Self::command(delay_seconds, message);

        command
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| PlatformError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        tracing::info!(delay_seconds, program = %command.program, "Shutdown command issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(windows))]
    #[test]
    fn test_unix_delay_rounds_up_to_minutes() {
        let command = CommandShutdown::command(60, "bye");
        assert_eq!(command.program, "shutdown");
        assert_eq!(command.args, vec!["-h", "+1", "bye"]);

        assert_eq!(CommandShutdown::command(61, "bye").args[1], "+2");
        assert_eq!(CommandShutdown::command(0, "bye").args[1], "now");
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_delay_in_seconds() {
        let command = CommandShutdown::command(600, "bye");
        assert_eq!(command.args, vec!["/s", "/t", "600", "/c", "bye"]);
    }
}
