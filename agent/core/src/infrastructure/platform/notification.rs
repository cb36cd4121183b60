// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use super::PlatformCommand;
use crate::domain::platform::{NotificationSink, PlatformError};

/// Desktop notification through the platform's stock tooling
/// (`notify-send`, `osascript`, `msg`).
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }

    pub fn command(message: &str, title: &str) -> PlatformCommand {
        #[cfg(target_os = "macos")]
        {
            let script = format!(
                "display notification {} with title {}",
                applescript_string(message),
                applescript_string(title)
            );
            PlatformCommand::new("osascript").arg("-e").arg(script)
        }

        #[cfg(windows)]
        {
            PlatformCommand::new("msg")
                .arg("*")
                .arg("/TIME:10")
                .arg(format!("{}: {}", title, message))
        }

        #[cfg(not(any(target_os = "macos", windows)))]
        {
            PlatformCommand::new("notify-send").arg(title).arg(message)
        }
    }
}

#[cfg(target_os = "macos")]
fn applescript_string(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

impl NotificationSink for DesktopNotifier {
    fn show(&self, message: &str, title: &str) -> Result<(), PlatformError> {
        let command = Self::command(message, title);

        let output = command
            .to_command()
            .output()
            .map_err(|source| PlatformError::Spawn {
                program: command.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PlatformError::CommandFailed {
                program: command.program,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

/// Writes the notification to the log instead of the desktop. Used for
/// headless agents and when notifications are disabled.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn show(&self, message: &str, title: &str) -> Result<(), PlatformError> {
        tracing::warn!(title = %title, "{}", message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(any(target_os = "macos", windows)))]
    #[test]
    fn test_linux_notification_command() {
        let command = DesktopNotifier::command("Shutting down in 1 minute(s).", "Remote Shutdown");
        assert_eq!(command.program, "notify-send");
        assert_eq!(
            command.args,
            vec!["Remote Shutdown", "Shutting down in 1 minute(s)."]
        );
    }

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.show("message", "title").is_ok());
    }
}
